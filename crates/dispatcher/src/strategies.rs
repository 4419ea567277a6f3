use rand::Rng;
use tracing::{debug, warn};

use router_core::{RoutingStrategy, Task};

use crate::registry::WorkerRegistry;

/// Worker选择策略
///
/// 在分发器的单写者循环内调用，因此可以持有可变状态（如轮询游标）而无需加锁。
/// 返回被选中Worker在池中的位置，池为空时返回 `None`。
pub trait DispatchStrategy: Send {
    fn select_worker(&mut self, task: &Task, pool: &WorkerRegistry) -> Option<usize>;

    fn name(&self) -> &'static str;
}

/// 轮询：单一游标，每次选择后前进，与任务无关
pub struct RoundRobinStrategy {
    cursor: usize,
}

pub struct RandomStrategy;

/// 最小负载：线性扫描已缓存的负载，相同负载取下标最小者
pub struct LeastLoadedStrategy;

/// `abs(hash(task_id)) % pool_size`
///
/// 只在池大小不变时稳定，任何扩缩容都会让几乎所有键重新映射。
pub struct ConsistentHashStrategy;

/// 优先级半区：`Critical`/`High` 落在前 `ceil(n/2)` 个Worker，`Normal`/`Low` 落在其余Worker
pub struct PriorityBasedStrategy;

impl RoundRobinStrategy {
    pub fn new() -> Self {
        Self { cursor: 0 }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// 池大小变化后把游标折回新范围
    pub fn on_pool_resized(&mut self, new_size: usize) {
        if new_size > 0 {
            self.cursor %= new_size;
        } else {
            self.cursor = 0;
        }
    }
}

impl Default for RoundRobinStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchStrategy for RoundRobinStrategy {
    fn select_worker(&mut self, _task: &Task, pool: &WorkerRegistry) -> Option<usize> {
        if pool.is_empty() {
            debug!("没有可用的Worker节点");
            return None;
        }
        let size = pool.len();
        let index = self.cursor % size;
        self.cursor = (self.cursor + 1) % size;

        debug!("轮询策略选择Worker索引: {}/{}", index, size);
        Some(index)
    }

    fn name(&self) -> &'static str {
        "RoundRobin"
    }
}

impl RandomStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RandomStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchStrategy for RandomStrategy {
    fn select_worker(&mut self, _task: &Task, pool: &WorkerRegistry) -> Option<usize> {
        if pool.is_empty() {
            debug!("没有可用的Worker节点");
            return None;
        }
        let index = rand::rng().random_range(0..pool.len());
        debug!("随机策略选择Worker索引: {}/{}", index, pool.len());
        Some(index)
    }

    fn name(&self) -> &'static str {
        "Random"
    }
}

impl LeastLoadedStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LeastLoadedStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchStrategy for LeastLoadedStrategy {
    fn select_worker(&mut self, _task: &Task, pool: &WorkerRegistry) -> Option<usize> {
        if pool.is_empty() {
            debug!("没有可用的Worker节点");
            return None;
        }
        let mut best = 0;
        let mut best_load = pool.load_at(0);
        for index in 1..pool.len() {
            let load = pool.load_at(index);
            if load < best_load {
                best = index;
                best_load = load;
            }
        }

        debug!("最小负载策略选择Worker索引: {} (负载: {})", best, best_load);
        Some(best)
    }

    fn name(&self) -> &'static str {
        "LeastLoaded"
    }
}

/// 32位多项式字符串哈希（乘数31，回绕运算），同一进程内外都稳定
pub fn task_key_hash(key: &str) -> i32 {
    key.chars()
        .fold(0i32, |hash, c| hash.wrapping_mul(31).wrapping_add(c as i32))
}

impl ConsistentHashStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsistentHashStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchStrategy for ConsistentHashStrategy {
    fn select_worker(&mut self, task: &Task, pool: &WorkerRegistry) -> Option<usize> {
        if pool.is_empty() {
            debug!("没有可用的Worker节点");
            return None;
        }
        let hash = task_key_hash(&task.id);
        let index = hash.unsigned_abs() as usize % pool.len();

        debug!(task_id = %task.id, "哈希策略选择Worker索引: {} (哈希: {})", index, hash);
        Some(index)
    }

    fn name(&self) -> &'static str {
        "ConsistentHash"
    }
}

impl PriorityBasedStrategy {
    pub fn new() -> Self {
        Self
    }

    /// 前半区大小 `ceil(n/2)`
    pub fn split_point(pool_size: usize) -> usize {
        pool_size.div_ceil(2)
    }
}

impl Default for PriorityBasedStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchStrategy for PriorityBasedStrategy {
    fn select_worker(&mut self, task: &Task, pool: &WorkerRegistry) -> Option<usize> {
        if pool.is_empty() {
            debug!("没有可用的Worker节点");
            return None;
        }
        let size = pool.len();
        let half = Self::split_point(size);
        let mut rng = rand::rng();

        let drawn = if task.priority.is_urgent() {
            rng.random_range(0..half)
        } else {
            // 池大小为1时后半区为空，抽到的下标会被截回最后一个Worker
            half + rng.random_range(0..(size - half).max(1))
        };
        let index = drawn.min(size - 1);

        debug!(
            task_id = %task.id,
            priority = %task.priority,
            "优先级策略选择Worker索引: {}/{}",
            index,
            size
        );
        Some(index)
    }

    fn name(&self) -> &'static str {
        "PriorityBased"
    }
}

/// 策略选择器
///
/// 持有全部单Worker策略的实例，使运行时切换策略时轮询游标得以保留。
pub struct StrategySelector {
    round_robin: RoundRobinStrategy,
    random: RandomStrategy,
    least_loaded: LeastLoadedStrategy,
    consistent_hash: ConsistentHashStrategy,
    priority_based: PriorityBasedStrategy,
}

impl StrategySelector {
    pub fn new() -> Self {
        Self {
            round_robin: RoundRobinStrategy::new(),
            random: RandomStrategy::new(),
            least_loaded: LeastLoadedStrategy::new(),
            consistent_hash: ConsistentHashStrategy::new(),
            priority_based: PriorityBasedStrategy::new(),
        }
    }

    fn strategy_mut(&mut self, strategy: RoutingStrategy) -> Option<&mut dyn DispatchStrategy> {
        match strategy {
            RoutingStrategy::RoundRobin => Some(&mut self.round_robin),
            RoutingStrategy::Random => Some(&mut self.random),
            RoutingStrategy::LeastLoaded => Some(&mut self.least_loaded),
            RoutingStrategy::ConsistentHash => Some(&mut self.consistent_hash),
            RoutingStrategy::PriorityBased => Some(&mut self.priority_based),
            RoutingStrategy::Broadcast => None,
        }
    }

    pub fn select(
        &mut self,
        strategy: RoutingStrategy,
        task: &Task,
        pool: &WorkerRegistry,
    ) -> Option<usize> {
        match self.strategy_mut(strategy) {
            Some(selector) => {
                let selected = selector.select_worker(task, pool);
                debug!(
                    task_id = %task.id,
                    strategy = selector.name(),
                    selected = ?selected,
                    "策略选择Worker"
                );
                selected
            }
            None => {
                warn!("广播模式不经过策略选择器: {}", task.id);
                None
            }
        }
    }

    pub fn on_pool_resized(&mut self, new_size: usize) {
        self.round_robin.on_pool_resized(new_size);
    }

    pub fn round_robin_cursor(&self) -> usize {
        self.round_robin.cursor()
    }
}

impl Default for StrategySelector {
    fn default() -> Self {
        Self::new()
    }
}
