use chrono::NaiveTime;
use chrono_tz::Tz;
use std::path::PathBuf;

use crate::utils::time;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/brasa | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | STORE_ID | stand-1 | 门店标识 (远端 inventories 命名空间) |
/// | REMOTE_SYNC_URL | (未设置) | 远端实时库 base URL，未设置时关闭镜像 |
/// | TIMEZONE | America/Bogota | 业务时区 (IANA 名称) |
/// | BUSINESS_DAY_CUTOFF | 00:00 | 营业日切换时间 (HH:MM) |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (未设置) | 日志目录，未设置时仅输出到终端 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/brasa HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 门店标识，映射到远端 `inventories/{store_key}` 子树
    pub store_id: String,
    /// 远端实时库 base URL (None = 镜像关闭)
    pub remote_sync_url: Option<String>,
    /// 业务时区
    pub timezone: Tz,
    /// 营业日切换时间
    pub business_day_cutoff: NaiveTime,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 日志级别
    pub log_level: String,
    /// 日志目录
    pub log_dir: Option<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/brasa".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            store_id: std::env::var("STORE_ID").unwrap_or_else(|_| "stand-1".into()),
            remote_sync_url: std::env::var("REMOTE_SYNC_URL").ok().filter(|s| !s.is_empty()),
            timezone: std::env::var("TIMEZONE")
                .ok()
                .and_then(|tz| tz.parse().ok())
                .unwrap_or(chrono_tz::America::Bogota),
            business_day_cutoff: time::parse_cutoff(
                &std::env::var("BUSINESS_DAY_CUTOFF").unwrap_or_else(|_| "00:00".into()),
            ),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
        }
    }

    /// 远端库存命名空间 key: store_id 中的 `.` 替换为 `_`
    pub fn store_key(&self) -> String {
        self.store_id.replace('.', "_")
    }

    /// 数据库目录: work_dir/database
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 数据库文件路径
    pub fn database_path(&self) -> PathBuf {
        self.database_dir().join("brasa.db")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        if let Some(log_dir) = &self.log_dir {
            std::fs::create_dir_all(log_dir)?;
        }
        Ok(())
    }

    /// 当前营业日范围 (业务时区)
    pub fn current_business_day_range(&self) -> time::DayRange {
        time::current_business_day_range(self.business_day_cutoff, self.timezone)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_dir: ".".into(),
            http_port: 3000,
            store_id: "stand-1".into(),
            remote_sync_url: None,
            timezone: chrono_tz::America::Bogota,
            business_day_cutoff: NaiveTime::MIN,
            environment: "development".into(),
            log_level: "info".into(),
            log_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_key_replaces_dots() {
        let config = Config {
            store_id: "brasa.bogota.1".into(),
            ..Config::default()
        };
        assert_eq!(config.store_key(), "brasa_bogota_1");
    }

    #[test]
    fn business_day_range_is_half_open_and_today() {
        let config = Config::default();
        let range = config.current_business_day_range();
        let now = shared::util::now_millis();
        assert!(range.contains(now));
        assert!(!range.contains(range.end));
    }
}
