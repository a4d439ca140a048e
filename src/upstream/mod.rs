// 上游模块
// 包含出站请求转发与全局准入节流

pub mod forwarder;
pub mod throttle;

// 重新导出常用类型，方便其他模块使用
pub use forwarder::{UpstreamForwarder, UpstreamResponse};
pub use throttle::{AdmissionControl, MinIntervalThrottle};
