//! 依赖注入容器 - 简化使用示例
//!
//! 展示类型注册、显式参数、接口绑定、单例和统计信息。

use injector::logging::{init_logging, LoggingConfig};
use injector::{
    args, BoxError, InjectError, Injectable, Injector, InjectorConfig, Parameter, ResolvedArgs,
    ServiceLifetime,
};
use std::collections::HashMap;
use std::sync::Arc;

// 示例服务结构
#[derive(Debug)]
struct Config {
    app_name: String,
    version: String,
}

impl Injectable for Config {
    const LIFETIME: ServiceLifetime = ServiceLifetime::Singleton;

    fn parameters() -> Vec<Parameter> {
        vec![
            Parameter::typed::<String>("app_name"),
            Parameter::typed::<String>("version").with_default(),
        ]
    }

    fn construct(args: &ResolvedArgs) -> Result<Self, BoxError> {
        Ok(Config {
            app_name: args.value("app_name")?,
            version: args.value_or("version", String::from("0.1.0"))?,
        })
    }
}

trait Logger: Send + Sync {
    fn log(&self, message: &str);
}

struct ConsoleLogger {
    config: Arc<Config>,
}

impl Injectable for ConsoleLogger {
    fn parameters() -> Vec<Parameter> {
        vec![Parameter::typed::<Config>("config")]
    }

    fn construct(args: &ResolvedArgs) -> Result<Self, BoxError> {
        Ok(ConsoleLogger {
            config: args.get("config")?,
        })
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        println!("[{} {}] {}", self.config.app_name, self.config.version, message);
    }
}

struct DatabaseService {
    logger: Arc<dyn Logger>,
    pool_size: u32,
}

impl Injectable for DatabaseService {
    fn parameters() -> Vec<Parameter> {
        vec![
            Parameter::typed::<dyn Logger>("logger"),
            Parameter::typed::<u32>("pool_size"),
        ]
    }

    fn construct(args: &ResolvedArgs) -> Result<Self, BoxError> {
        let logger: Arc<dyn Logger> = args.get("logger")?;
        logger.log("Initializing database service");
        Ok(DatabaseService {
            logger,
            pool_size: args.value("pool_size")?,
        })
    }
}

impl DatabaseService {
    fn connect(&self) {
        self.logger
            .log(&format!("Connecting to database with {} connections", self.pool_size));
    }
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_logging(LoggingConfig::development())?;

    println!("🚀 依赖注入容器 - 简化使用示例\n");

    // 环境变量可以覆盖默认配置
    let env: HashMap<String, String> = std::env::vars().collect();
    let mut config = InjectorConfig::default();
    config.apply_env_overrides(&env)?;
    config.validate()?;
    let injector = Injector::with_config(config);

    println!("1️⃣ 注册配置服务（单例，命名参数）");
    injector.add_with::<Config>(args![; app_name = String::from("MyApp")])?;

    println!("2️⃣ 注册日志服务并绑定到 Logger 接口");
    injector.add::<ConsoleLogger>()?;
    injector.bind::<dyn Logger, ConsoleLogger, _>(|logger| logger)?;

    println!("3️⃣ 注册数据库服务（命名参数）");
    injector.add_with::<DatabaseService>(args![].named("pool_size", 8u32))?;

    println!("\n✅ 所有服务注册完成！\n");

    println!("4️⃣ 解析和使用服务");
    let config = injector.get::<Config>()?;
    println!("配置信息: {:?}", config);

    let db_service = injector.get::<DatabaseService>()?;
    db_service.connect();

    println!("\n5️⃣ 验证单例行为");
    let config2 = injector.get::<Config>()?;
    println!("配置1和配置2是同一个实例: {}", Arc::ptr_eq(&config, &config2));

    println!("\n6️⃣ 演示错误处理");
    match injector.get::<String>() {
        Err(InjectError::UnregisteredType { type_name }) => {
            println!("未注册的类型: {}", type_name)
        }
        other => println!("意外结果: {:?}", other.map(|_| ())),
    }

    println!("\n7️⃣ 演示统计功能");
    let stats = injector.stats();
    println!("容器统计信息:");
    println!("   📊 总解析次数: {}", stats.total_resolutions);
    println!("   📋 注册服务数量: {}", stats.registered_services);
    println!("   🎯 缓存命中率: {:.1}%", stats.hit_rate() * 100.0);
    println!("   ⚡ 瞬态服务创建: {}", stats.transient_creations);

    println!("\n✅ 示例完成！");

    Ok(())
}
