//! 容器并发解析测试

use futures::future;
use injector::{
    BoxError, InjectError, Injectable, Injector, Parameter, ResolvedArgs, ServiceLifetime,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

static CONFIG_CREATIONS: AtomicUsize = AtomicUsize::new(0);

/// 构造较慢的单例，放大并发初始化的竞争窗口
struct SharedConfig {
    multiplier: i32,
}

impl Injectable for SharedConfig {
    const LIFETIME: ServiceLifetime = ServiceLifetime::Singleton;

    fn construct(_: &ResolvedArgs) -> Result<Self, BoxError> {
        CONFIG_CREATIONS.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(20));
        Ok(SharedConfig { multiplier: 3 })
    }
}

struct Calculator {
    config: Arc<SharedConfig>,
}

impl Injectable for Calculator {
    fn parameters() -> Vec<Parameter> {
        vec![Parameter::typed::<SharedConfig>("config")]
    }

    fn construct(args: &ResolvedArgs) -> Result<Self, BoxError> {
        Ok(Calculator {
            config: args.get("config")?,
        })
    }
}

impl Calculator {
    fn process(&self, input: i32) -> i32 {
        input * self.config.multiplier
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_singleton_constructed_once_under_contention() {
    let injector = Injector::new();
    injector.add::<SharedConfig>().unwrap();
    injector.add::<Calculator>().unwrap();

    let mut handles = vec![];
    for i in 0..50 {
        let injector = injector.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let calculator = injector.get::<Calculator>().unwrap();
            (i, calculator)
        }));
    }

    let results = future::join_all(handles).await;

    let mut calculators = Vec::new();
    for res in results {
        let (index, calculator) = res.unwrap();
        assert_eq!(calculator.process(index), index * 3);
        calculators.push(calculator);
    }

    // 瞬态服务各不相同，但共享同一个单例依赖
    for pair in calculators.windows(2) {
        assert!(!Arc::ptr_eq(&pair[0], &pair[1]));
        assert!(Arc::ptr_eq(&pair[0].config, &pair[1].config));
    }
    assert_eq!(CONFIG_CREATIONS.load(Ordering::SeqCst), 1);

    let stats = injector.stats();
    assert_eq!(stats.transient_creations, 50);
    assert_eq!(stats.cache_misses, 1);
    assert_eq!(stats.registered_services, 2);
}

#[tokio::test]
async fn test_concurrent_resolution_from_tasks() {
    let injector = Injector::new();
    injector
        .register_factory(vec![], injector::args![], ServiceLifetime::Singleton, |_| {
            Ok(String::from("shared"))
        })
        .unwrap();

    let mut handles = vec![];
    for _ in 0..1000 {
        let injector = injector.clone();
        handles.push(tokio::spawn(async move { injector.get::<String>() }));
    }

    let results = future::join_all(handles).await;
    assert_eq!(results.len(), 1000);

    let first = injector.get::<String>().unwrap();
    for result in results {
        let value = result.unwrap().unwrap();
        assert!(Arc::ptr_eq(&value, &first));
    }

    let stats = injector.stats();
    assert_eq!(stats.total_resolutions, 1001);
    assert_eq!(stats.cache_misses, 1);
    assert!(stats.hit_rate() > 0.99);
}

#[tokio::test]
async fn test_registration_while_resolving() {
    let injector = Injector::new();
    let registered = Arc::new(AtomicUsize::new(0));

    let writer = {
        let injector = injector.clone();
        let registered = registered.clone();
        tokio::task::spawn_blocking(move || {
            for i in 0..100u64 {
                injector
                    .register_factory(vec![], injector::args![], ServiceLifetime::Transient, move |_| {
                        Ok(i)
                    })
                    .unwrap();
                registered.fetch_add(1, Ordering::SeqCst);
            }
        })
    };

    let reader = {
        let injector = injector.clone();
        tokio::task::spawn_blocking(move || {
            let mut seen = 0;
            for _ in 0..100 {
                match injector.get::<u64>() {
                    Ok(_) => seen += 1,
                    Err(InjectError::UnregisteredType { .. }) => {}
                    Err(err) => panic!("unexpected error: {}", err),
                }
            }
            seen
        })
    };

    writer.await.unwrap();
    let seen = reader.await.unwrap();

    assert!(seen <= 100);
    assert_eq!(registered.load(Ordering::SeqCst), 100);
    assert_eq!(*injector.get::<u64>().unwrap(), 99);
    assert_eq!(injector.stats().registered_services, 1);
}
