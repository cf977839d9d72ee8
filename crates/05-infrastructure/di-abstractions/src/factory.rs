//! 实例生产者抽象接口
//!
//! 生产者作为占位绑定登记到容器中，每次解析都会重新调用。

use async_trait::async_trait;
use di_common::{BoxError, Instance, TypeInfo};
use futures::future::BoxFuture;
use std::marker::PhantomData;
use std::sync::Arc;

/// 实例生产者 trait
#[async_trait]
pub trait InstanceProducer: Send + Sync + 'static {
    /// 生产的具体类型
    type Output: Send + Sync + 'static;

    /// 生产一个实例
    async fn create(&self) -> Result<Self::Output, BoxError>;

    /// 获取生产者名称
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// 类型擦除后的生产者，容器内部持有
pub trait ErasedProducer: Send + Sync {
    /// 生产者名称
    fn name(&self) -> &str;

    /// 生产的具体类型
    fn output_type(&self) -> TypeInfo;

    /// 生产一个实例
    fn produce(&self) -> BoxFuture<'_, Result<Instance, BoxError>>;
}

impl<P: InstanceProducer> ErasedProducer for P {
    fn name(&self) -> &str {
        InstanceProducer::name(self)
    }

    fn output_type(&self) -> TypeInfo {
        TypeInfo::of::<P::Output>()
    }

    fn produce(&self) -> BoxFuture<'_, Result<Instance, BoxError>> {
        Box::pin(async move {
            let value = self.create().await?;
            Ok(Arc::new(value) as Instance)
        })
    }
}

/// Lambda 生产者包装器
pub struct LambdaProducer<T, F>
where
    T: Send + Sync + 'static,
    F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
{
    producer_fn: F,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F> LambdaProducer<T, F>
where
    T: Send + Sync + 'static,
    F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
{
    /// 创建 Lambda 生产者
    pub fn new(producer_fn: F) -> Self {
        Self {
            producer_fn,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T, F> InstanceProducer for LambdaProducer<T, F>
where
    T: Send + Sync + 'static,
    F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
{
    type Output = T;

    async fn create(&self) -> Result<T, BoxError> {
        (self.producer_fn)()
    }
}
