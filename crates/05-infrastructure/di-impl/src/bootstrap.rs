//! 应用启动

use crate::container::Container;
use async_trait::async_trait;
use di_common::BoxError;
use std::sync::Arc;
use tracing::info;

/// 由容器托管启动的应用
///
/// 启动顺序：[`setup`](Application::setup) 注册绑定，随后容器对应用自身执行成员注入，
/// 最后调用 [`start`](Application::start)。
#[async_trait]
pub trait Application: Send + Sync + 'static {
    /// 注册绑定与类型描述
    async fn setup(&self, _container: &Container) -> Result<(), BoxError> {
        Ok(())
    }

    /// 成员注入完成后运行
    async fn start(&self, container: &Container) -> Result<(), BoxError>;
}

/// 按启动顺序运行应用
pub async fn launch<A: Application>(app: Arc<A>, container: &Container) -> Result<(), BoxError> {
    let name = std::any::type_name::<A>();
    info!("启动应用: {}", name);

    app.setup(container).await?;
    container.inject_members(&app).await?;
    app.start(container).await?;

    info!("应用已启动: {}", name);
    Ok(())
}
