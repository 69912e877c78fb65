use crate::api;
use crate::core::{Config, ServerState};

/// HTTP 服务器
///
/// 持有配置和状态，`run()` 绑定端口并服务到进程结束。
pub struct Server {
    config: Config,
    state: ServerState,
}

impl Server {
    /// 使用已初始化的状态构建服务器
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self { config, state }
    }

    /// 启动 HTTP 服务器 (自动启动后台任务)
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        self.state.start_background_tasks();

        let app = api::build_app().with_state(self.state);

        let addr = format!("0.0.0.0:{}", self.config.http_port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("HTTP API listening on http://{addr}");

        axum::serve(listener, app).await?;
        Ok(())
    }
}
