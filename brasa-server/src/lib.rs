//! Brasa POS Server - 小型餐饮摊位销售点后端
//!
//! # 架构概述
//!
//! 本模块是服务器的主入口，提供以下核心功能：
//!
//! - **业务容器** (`ledgers`): 库存、商品、销售、厨房订单、支出、收银
//! - **确认销售** (`checkout`): 库存扣减 + 账本追加 + 厨房订单的编排
//! - **嵌入式存储** (`store`): redb 键值存储，断电安全
//! - **远端镜像** (`remote`): 实时库镜像 + 持久化 outbox
//! - **HTTP API** (`api`): RESTful API 接口 + SSE 同步流
//!
//! # 模块结构
//!
//! ```text
//! brasa-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── ledgers/       # 六个业务状态容器
//! ├── checkout.rs    # 确认销售编排
//! ├── store/         # 嵌入式存储 (redb)
//! ├── remote/        # 远端镜像 + outbox
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod checkout;
pub mod core;
pub mod ledgers;
pub mod remote;
pub mod store;
pub mod utils;

// Re-export 公共类型
pub use checkout::{Checkout, CheckoutReceipt};
pub use core::{Config, Server, ServerState};
pub use ledgers::{
    CashRegister, ExpenseLedger, InventoryLedger, OrderQueue, ProductCatalog, SalesLedger,
};
pub use remote::{HttpRemote, MemoryRemote, Mirror, MirrorStatus, RemoteStore};
pub use store::{LedgerStore, StoreError};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() {
    dotenv::dotenv().ok();
    let config = Config::from_env();
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
}
