//! 构造任务执行器

use async_trait::async_trait;
use di_abstractions::{BlockingTask, TaskRunner};
use di_common::{BoxError, Instance};

/// 在当前任务中直接执行构造
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineTaskRunner;

#[async_trait]
impl TaskRunner for InlineTaskRunner {
    fn name(&self) -> &str {
        "inline"
    }

    async fn run_blocking(&self, task: BlockingTask) -> Result<Instance, BoxError> {
        task()
    }
}

/// 在 tokio 阻塞线程池中执行构造
///
/// 需要在 tokio 运行时中使用。
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioTaskRunner;

#[async_trait]
impl TaskRunner for TokioTaskRunner {
    fn name(&self) -> &str {
        "tokio-blocking"
    }

    async fn run_blocking(&self, task: BlockingTask) -> Result<Instance, BoxError> {
        tokio::task::spawn_blocking(task).await?
    }
}
