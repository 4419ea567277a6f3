#[cfg(test)]
mod strategies_tests {
    use std::collections::HashSet;

    use crate::registry::WorkerRegistry;
    use crate::strategies::*;
    use router_core::*;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn create_test_task(id: &str, priority: TaskPriority) -> Task {
        Task::new(id, json!({"n": 1}), priority)
    }

    fn create_test_pool(size: usize) -> WorkerRegistry {
        let mut registry = WorkerRegistry::new();
        for i in 0..size {
            let (tx, _rx) = mpsc::unbounded_channel();
            registry.push(WorkerHandle::new(format!("worker-{i}"), tx));
        }
        registry
    }

    fn set_load(pool: &mut WorkerRegistry, index: usize, load: u32) {
        let id = pool.get(index).unwrap().id().to_string();
        pool.update_snapshot(WorkerMetricsSnapshot {
            current_load: load,
            ..WorkerMetricsSnapshot::unknown(id)
        });
    }

    #[test]
    fn test_round_robin_strategy_is_fair_and_cyclic() {
        let mut strategy = RoundRobinStrategy::new();
        let pool = create_test_pool(3);
        let task = create_test_task("t", TaskPriority::Normal);

        let mut counts = [0usize; 3];
        let mut order = Vec::new();
        for _ in 0..(4 * 3) {
            let index = strategy.select_worker(&task, &pool).unwrap();
            counts[index] += 1;
            order.push(index);
        }

        assert_eq!(counts, [4, 4, 4]);
        assert_eq!(&order[..6], &[0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn test_round_robin_strategy_no_workers() {
        let mut strategy = RoundRobinStrategy::new();
        let pool = WorkerRegistry::new();
        let task = create_test_task("t", TaskPriority::Normal);

        assert!(strategy.select_worker(&task, &pool).is_none());
    }

    #[test]
    fn test_round_robin_cursor_wraps_on_shrink() {
        let mut strategy = RoundRobinStrategy::new();
        let pool = create_test_pool(5);
        let task = create_test_task("t", TaskPriority::Normal);
        for _ in 0..4 {
            strategy.select_worker(&task, &pool);
        }
        assert_eq!(strategy.cursor(), 4);

        strategy.on_pool_resized(3);
        assert_eq!(strategy.cursor(), 1);

        let smaller = create_test_pool(3);
        assert_eq!(strategy.select_worker(&task, &smaller), Some(1));
    }

    #[test]
    fn test_random_strategy_stays_in_range() {
        let mut strategy = RandomStrategy::new();
        let pool = create_test_pool(4);
        let task = create_test_task("t", TaskPriority::Normal);

        let seen: HashSet<usize> = (0..500)
            .map(|_| strategy.select_worker(&task, &pool).unwrap())
            .collect();
        assert!(seen.iter().all(|i| *i < 4));
        assert!(seen.len() > 1);
    }

    #[test]
    fn test_least_loaded_picks_minimum_with_first_seen_tie_break() {
        let mut strategy = LeastLoadedStrategy::new();
        let mut pool = create_test_pool(4);
        set_load(&mut pool, 0, 3);
        set_load(&mut pool, 1, 1);
        set_load(&mut pool, 2, 1);
        set_load(&mut pool, 3, 5);
        let task = create_test_task("t", TaskPriority::Normal);

        assert_eq!(strategy.select_worker(&task, &pool), Some(1));
    }

    #[test]
    fn test_least_loaded_prefers_never_queried_worker() {
        let mut strategy = LeastLoadedStrategy::new();
        let mut pool = create_test_pool(3);
        set_load(&mut pool, 0, 2);
        set_load(&mut pool, 1, 2);
        let task = create_test_task("t", TaskPriority::Normal);

        assert_eq!(strategy.select_worker(&task, &pool), Some(2));
    }

    #[test]
    fn test_task_key_hash_values() {
        assert_eq!(task_key_hash(""), 0);
        assert_eq!(task_key_hash("a"), 97);
        assert_eq!(task_key_hash("ab"), 97 * 31 + 98);
    }

    #[test]
    fn test_consistent_hash_is_stable_for_fixed_pool() {
        let mut strategy = ConsistentHashStrategy::new();
        let pool = create_test_pool(7);

        for i in 0..50 {
            let id = format!("task-{i}");
            let first = strategy.select_worker(&create_test_task(&id, TaskPriority::Low), &pool);
            let second = strategy.select_worker(&create_test_task(&id, TaskPriority::High), &pool);
            assert_eq!(first, second);
            let expected = task_key_hash(&id).unsigned_abs() as usize % 7;
            assert_eq!(first, Some(expected));
        }
    }

    #[test]
    fn test_consistent_hash_remaps_after_resize() {
        let mut strategy = ConsistentHashStrategy::new();
        let pool_a = create_test_pool(5);
        let pool_b = create_test_pool(6);

        let moved = (0..100)
            .map(|i| create_test_task(&format!("task-{i}"), TaskPriority::Normal))
            .filter(|task| {
                strategy.select_worker(task, &pool_a) != strategy.select_worker(task, &pool_b)
            })
            .count();
        assert!(moved > 0);
    }

    #[test]
    fn test_priority_split_with_even_pool() {
        let mut strategy = PriorityBasedStrategy::new();
        let pool = create_test_pool(4);

        let critical = create_test_task("c", TaskPriority::Critical);
        let low = create_test_task("l", TaskPriority::Low);

        let urgent: HashSet<usize> = (0..1000)
            .map(|_| strategy.select_worker(&critical, &pool).unwrap())
            .collect();
        let relaxed: HashSet<usize> = (0..1000)
            .map(|_| strategy.select_worker(&low, &pool).unwrap())
            .collect();

        assert_eq!(urgent, HashSet::from([0, 1]));
        assert_eq!(relaxed, HashSet::from([2, 3]));
    }

    #[test]
    fn test_priority_split_with_odd_pool() {
        let mut strategy = PriorityBasedStrategy::new();
        let pool = create_test_pool(5);
        assert_eq!(PriorityBasedStrategy::split_point(5), 3);

        let high = create_test_task("h", TaskPriority::High);
        let normal = create_test_task("n", TaskPriority::Normal);
        for _ in 0..500 {
            assert!(strategy.select_worker(&high, &pool).unwrap() < 3);
            assert!(strategy.select_worker(&normal, &pool).unwrap() >= 3);
        }
    }

    #[test]
    fn test_priority_single_worker_pool() {
        let mut strategy = PriorityBasedStrategy::new();
        let pool = create_test_pool(1);

        for priority in [TaskPriority::Critical, TaskPriority::Low] {
            let task = create_test_task("t", priority);
            assert_eq!(strategy.select_worker(&task, &pool), Some(0));
        }
    }

    #[test]
    fn test_selector_keeps_cursor_across_strategy_switch() {
        let mut selector = StrategySelector::new();
        let pool = create_test_pool(3);
        let task = create_test_task("t", TaskPriority::Normal);

        assert_eq!(selector.select(RoutingStrategy::RoundRobin, &task, &pool), Some(0));
        selector.select(RoutingStrategy::Random, &task, &pool);
        assert_eq!(selector.select(RoutingStrategy::RoundRobin, &task, &pool), Some(1));
        assert_eq!(selector.round_robin_cursor(), 2);
    }

    #[test]
    fn test_selector_rejects_broadcast() {
        let mut selector = StrategySelector::new();
        let pool = create_test_pool(3);
        let task = create_test_task("t", TaskPriority::Normal);

        assert!(selector.select(RoutingStrategy::Broadcast, &task, &pool).is_none());
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!(RoundRobinStrategy::new().name(), "RoundRobin");
        assert_eq!(RandomStrategy::new().name(), "Random");
        assert_eq!(LeastLoadedStrategy::new().name(), "LeastLoaded");
        assert_eq!(ConsistentHashStrategy::new().name(), "ConsistentHash");
        assert_eq!(PriorityBasedStrategy::new().name(), "PriorityBased");
    }
}
