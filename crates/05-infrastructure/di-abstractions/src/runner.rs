//! 任务执行器抽象接口

use async_trait::async_trait;
use di_common::{BoxError, Instance};

/// 需要在执行器上运行的构造任务
pub type BlockingTask = Box<dyn FnOnce() -> Result<Instance, BoxError> + Send + 'static>;

/// 任务执行器 trait
///
/// 构造函数调用可能阻塞，由执行器决定在哪个线程上运行。
#[async_trait]
pub trait TaskRunner: Send + Sync {
    /// 执行器名称
    fn name(&self) -> &str;

    /// 运行构造任务并等待结果
    async fn run_blocking(&self, task: BlockingTask) -> Result<Instance, BoxError>;
}
