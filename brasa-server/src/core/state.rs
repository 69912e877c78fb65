use dashmap::DashMap;
use shared::message::{BusMessage, SyncPayload};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::checkout::Checkout;
use crate::core::Config;
use crate::ledgers::{
    CashRegister, ExpenseLedger, InventoryLedger, OrderQueue, ProductCatalog, SalesLedger,
};
use crate::remote::{HttpRemote, Mirror, RemoteStore};
use crate::store::LedgerStore;
use crate::utils::time::DayRange;
use shared::error::AppResult;

/// Sync bus channel capacity
const BUS_CHANNEL_CAPACITY: usize = 1024;

/// 资源版本管理器
///
/// 使用 DashMap 实现无锁并发的版本号管理。
/// 每种资源类型维护独立的版本号，支持原子递增。
///
/// 用于 broadcast_sync 时自动生成递增的版本号，
/// 确保客户端可以通过版本号判断数据新旧。
#[derive(Debug, Default)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    /// 创建空的版本管理器
    pub fn new() -> Self {
        Self {
            versions: DashMap::new(),
        }
    }

    /// 递增指定资源的版本号并返回新值
    ///
    /// 如果资源不存在，从 0 开始递增（返回 1）
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// 获取指定资源的当前版本号
    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }
}

/// 服务器状态 - 持有所有状态容器的单例引用
///
/// ServerState 是整个 POS 的核心数据结构，持有六个业务容器和基础设施
/// 服务的共享引用。使用 Arc 实现浅拷贝，所有权成本极低。所有容器在
/// [`initialize`](Self::initialize) 中一次性构建，没有全局可变状态。
///
/// # 组件
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | store | 嵌入式存储 (redb) |
/// | mirror | 远端镜像 + outbox |
/// | inventory | 库存容器 |
/// | catalog | 商品目录 |
/// | sales | 购物车和销售账本 |
/// | orders | 厨房订单队列 |
/// | expenses | 支出账本 |
/// | cash | 收银台 |
/// | checkout | 确认销售编排 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式存储
    pub store: Arc<LedgerStore>,
    /// 远端镜像
    pub mirror: Arc<Mirror>,
    /// 库存容器
    pub inventory: Arc<InventoryLedger>,
    /// 商品目录
    pub catalog: Arc<ProductCatalog>,
    /// 购物车和销售账本
    pub sales: Arc<SalesLedger>,
    /// 厨房订单队列
    pub orders: Arc<OrderQueue>,
    /// 支出账本
    pub expenses: Arc<ExpenseLedger>,
    /// 收银台
    pub cash: Arc<CashRegister>,
    /// 确认销售编排
    pub checkout: Arc<Checkout>,
    /// 同步消息总线
    bus: broadcast::Sender<BusMessage>,
    /// 资源版本管理器
    pub resource_versions: Arc<ResourceVersions>,
    /// 实例标识 - 每次启动生成，客户端据此检测重启并全量重同步
    epoch: String,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按依赖顺序构建：工作目录 → 嵌入式存储 → 远端镜像 →
    /// 六个业务容器 → checkout 编排。远端客户端由配置决定：
    /// `REMOTE_SYNC_URL` 未设置时镜像关闭。
    pub fn initialize(config: &Config) -> AppResult<Self> {
        let remote: Option<Arc<dyn RemoteStore>> = config
            .remote_sync_url
            .as_ref()
            .map(|url| Arc::new(HttpRemote::new(url.clone())) as Arc<dyn RemoteStore>);
        Self::initialize_with_remote(config, remote)
    }

    /// 初始化并注入远端实现 (测试使用 MemoryRemote)
    pub fn initialize_with_remote(
        config: &Config,
        remote: Option<Arc<dyn RemoteStore>>,
    ) -> AppResult<Self> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| shared::error::AppError::internal(format!("work dir: {e}")))?;

        let store = Arc::new(LedgerStore::open(config.database_path())?);
        let mirror = Arc::new(Mirror::new(remote, Arc::clone(&store)));

        let inventory = Arc::new(InventoryLedger::load(
            Arc::clone(&store),
            Arc::clone(&mirror),
            &config.store_key(),
        )?);
        let catalog = Arc::new(ProductCatalog::load(Arc::clone(&store))?);
        let sales = Arc::new(SalesLedger::load(Arc::clone(&store), Arc::clone(&mirror))?);
        let orders = Arc::new(OrderQueue::load(Arc::clone(&store), Arc::clone(&mirror))?);
        let expenses = Arc::new(ExpenseLedger::load(Arc::clone(&store), Arc::clone(&mirror))?);
        let cash = Arc::new(CashRegister::load(
            Arc::clone(&store),
            Arc::clone(&sales),
            Arc::clone(&expenses),
        )?);
        let checkout = Arc::new(Checkout::new(
            Arc::clone(&inventory),
            Arc::clone(&catalog),
            Arc::clone(&sales),
            Arc::clone(&orders),
            Arc::clone(&expenses),
        ));

        let (bus, _) = broadcast::channel(BUS_CHANNEL_CAPACITY);
        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(epoch = %epoch, mirror = mirror.is_enabled(), "Server state initialized");

        Ok(Self {
            config: config.clone(),
            store,
            mirror,
            inventory,
            catalog,
            sales,
            orders,
            expenses,
            cash,
            checkout,
            bus,
            resource_versions: Arc::new(ResourceVersions::new()),
            epoch,
        })
    }

    /// 启动后台任务
    ///
    /// 必须在 `Server::run()` 之前调用
    ///
    /// 启动的任务：
    /// - Outbox 刷新循环 (远端镜像重试)
    pub fn start_background_tasks(&self) {
        self.mirror.spawn_flush_loop();
    }

    /// Get the server epoch (unique instance ID)
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    /// 当前营业日范围
    pub fn business_day_range(&self) -> DayRange {
        self.config.current_business_day_range()
    }

    /// 订阅同步消息总线
    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.bus.subscribe()
    }

    /// 广播同步消息
    ///
    /// 向所有订阅的客户端广播资源变更通知。
    /// 版本号由 ResourceVersions 自动递增管理。
    ///
    /// # 参数
    /// - `resource`: 资源类型 (如 "inventory", "product", "order")
    /// - `action`: 变更类型 ("created", "updated", "deleted", "closed")
    /// - `id`: 资源 ID
    /// - `data`: 资源数据 (deleted 时为 None)
    pub fn broadcast_sync<T: serde::Serialize>(
        &self,
        resource: &str,
        action: &str,
        id: &str,
        data: Option<&T>,
    ) {
        let version = self.resource_versions.increment(resource);
        let payload = SyncPayload {
            resource: resource.to_string(),
            version,
            action: action.to_string(),
            id: id.to_string(),
            data: data.and_then(|d| serde_json::to_value(d).ok()),
        };
        // No subscribers is fine; the bus drops the message
        let _ = self.bus.send(BusMessage::sync(&payload));
    }
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("epoch", &self.epoch)
            .field("mirror", &self.mirror.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_versions_increment_independently() {
        let versions = ResourceVersions::new();
        assert_eq!(versions.get("order"), 0);
        assert_eq!(versions.increment("order"), 1);
        assert_eq!(versions.increment("order"), 2);
        assert_eq!(versions.increment("product"), 1);
        assert_eq!(versions.get("order"), 2);
    }

    #[tokio::test]
    async fn broadcast_sync_reaches_subscribers_with_versions() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            work_dir: dir.path().to_string_lossy().into_owned(),
            ..Config::default()
        };
        let state = ServerState::initialize(&config).unwrap();

        let mut rx = state.subscribe();
        state.broadcast_sync("order", "created", "1", Some(&serde_json::json!({"qty": 1})));
        state.broadcast_sync::<()>("order", "deleted", "1", None);

        let BusMessage::Sync(first) = rx.recv().await.unwrap();
        assert_eq!(first.version, 1);
        assert_eq!(first.action, "created");
        let BusMessage::Sync(second) = rx.recv().await.unwrap();
        assert_eq!(second.version, 2);
        assert!(second.data.is_none());
    }
}
