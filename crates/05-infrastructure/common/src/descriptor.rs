//! 类型描述符
//!
//! 以静态元数据表代替运行时反射：每个可构造类型登记自己的构造函数、
//! 可注入成员、生命周期钩子以及可向上转换的抽象类型。

use crate::errors::BoxError;
use crate::injection::{Injected, InstanceSet};
use crate::lifecycle::{AsyncInitializing, Disposable};
use crate::metadata::TypeInfo;
use futures::future::BoxFuture;
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// 容器内部持有的实例，内部值为具体类型 `T`
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 类型擦除后的注入值，内部为 `Arc<R>`、`Vec<Arc<R>>` 或 `InstanceSet<R>` 等
pub type BoxValue = Box<dyn Any + Send + Sync>;

/// 实例引用
pub type InstanceRef<'a> = &'a (dyn Any + Send + Sync);

/// 将具体实例转换为 `Box<Arc<R>>`
pub type Caster = Arc<dyn Fn(Instance) -> Option<BoxValue> + Send + Sync>;

/// 异步生命周期钩子
pub type AsyncHook = Arc<dyn Fn(Instance) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

type Packer = fn(Vec<BoxValue>) -> Option<BoxValue>;
type Invoker = Arc<dyn Fn(Args) -> Result<Instance, BoxError> + Send + Sync>;
type Setter = Arc<dyn Fn(InstanceRef<'_>, BoxValue) -> Result<(), BoxError> + Send + Sync>;
type MethodInvoker = Arc<dyn Fn(InstanceRef<'_>, Args) -> Result<(), BoxError> + Send + Sync>;
type HookFn = Arc<dyn Fn(InstanceRef<'_>) -> Result<(), BoxError> + Send + Sync>;

/// 依赖的基数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// 单个值
    Single,
    /// 按注册顺序排列的列表
    List,
    /// 按实例身份去重的集合
    Set,
}

/// 可解析的依赖槽位：构造参数、字段或方法参数
#[derive(Clone)]
pub struct Dependency {
    name: &'static str,
    element: TypeInfo,
    cardinality: Cardinality,
    qualifier: String,
    inject: bool,
    pack: Packer,
}

impl Dependency {
    /// 单值依赖，注入为 `Arc<R>`
    pub fn single<R: ?Sized + Send + Sync + 'static>(name: &'static str) -> Self {
        Self::with_packer::<R>(name, Cardinality::Single, pack_single::<R>)
    }

    /// 列表依赖，注入为 `Vec<Arc<R>>`
    pub fn list<R: ?Sized + Send + Sync + 'static>(name: &'static str) -> Self {
        Self::with_packer::<R>(name, Cardinality::List, pack_list::<R>)
    }

    /// 集合依赖，注入为 `InstanceSet<R>`
    pub fn set<R: ?Sized + Send + Sync + 'static>(name: &'static str) -> Self {
        Self::with_packer::<R>(name, Cardinality::Set, pack_set::<R>)
    }

    fn with_packer<R: ?Sized + 'static>(
        name: &'static str,
        cardinality: Cardinality,
        pack: Packer,
    ) -> Self {
        Self {
            name,
            element: TypeInfo::of::<R>(),
            cardinality,
            qualifier: String::new(),
            inject: false,
            pack,
        }
    }

    /// 设置限定符
    pub fn named(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = qualifier.into();
        self
    }

    /// 标记为注入点
    pub fn inject(mut self) -> Self {
        self.inject = true;
        self
    }

    /// 名称
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 元素类型
    pub fn element(&self) -> &TypeInfo {
        &self.element
    }

    /// 基数
    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// 限定符，空字符串表示无限定
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    /// 是否带注入标记
    pub fn is_inject(&self) -> bool {
        self.inject
    }

    /// 把逐个解析出的 `Box<Arc<R>>` 打包为槽位类型
    pub fn pack(&self, values: Vec<BoxValue>) -> Option<BoxValue> {
        (self.pack)(values)
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependency")
            .field("name", &self.name)
            .field("element", &self.element)
            .field("cardinality", &self.cardinality)
            .field("qualifier", &self.qualifier)
            .field("inject", &self.inject)
            .finish()
    }
}

fn pack_single<R: ?Sized + Send + Sync + 'static>(mut values: Vec<BoxValue>) -> Option<BoxValue> {
    if values.len() != 1 {
        return None;
    }
    values.pop().filter(|value| value.is::<Arc<R>>())
}

fn unpack_all<R: ?Sized + Send + Sync + 'static>(values: Vec<BoxValue>) -> Option<Vec<Arc<R>>> {
    values
        .into_iter()
        .map(|value| value.downcast::<Arc<R>>().ok().map(|value| *value))
        .collect()
}

fn pack_list<R: ?Sized + Send + Sync + 'static>(values: Vec<BoxValue>) -> Option<BoxValue> {
    unpack_all::<R>(values).map(|items| Box::new(items) as BoxValue)
}

fn pack_set<R: ?Sized + Send + Sync + 'static>(values: Vec<BoxValue>) -> Option<BoxValue> {
    unpack_all::<R>(values)
        .map(|items| Box::new(items.into_iter().collect::<InstanceSet<R>>()) as BoxValue)
}

/// 传给构造函数和注入方法的参数
///
/// 未参与解析的参数位置为空，读取时得到 `None`。
pub struct Args {
    owner: &'static str,
    values: Vec<Option<BoxValue>>,
}

impl Args {
    /// 创建参数表
    pub fn new(owner: &'static str, values: Vec<Option<BoxValue>>) -> Self {
        Self { owner, values }
    }

    /// 参数个数
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否没有参数
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 取出任意类型的参数值
    pub fn take<V: Any>(&mut self, index: usize) -> Option<V> {
        self.values
            .get_mut(index)?
            .take()?
            .downcast::<V>()
            .ok()
            .map(|value| *value)
    }

    /// 取出必需的单值参数
    pub fn get<R: ?Sized + Send + Sync + 'static>(&mut self, index: usize) -> Result<Arc<R>, BoxError> {
        self.take::<Arc<R>>(index).ok_or_else(|| self.missing(index))
    }

    /// 取出可选的单值参数，未解析时为 `None`
    pub fn optional<R: ?Sized + Send + Sync + 'static>(&mut self, index: usize) -> Option<Arc<R>> {
        self.take::<Arc<R>>(index)
    }

    /// 取出列表参数
    pub fn list<R: ?Sized + Send + Sync + 'static>(&mut self, index: usize) -> Result<Vec<Arc<R>>, BoxError> {
        self.take::<Vec<Arc<R>>>(index).ok_or_else(|| self.missing(index))
    }

    /// 取出集合参数
    pub fn set<R: ?Sized + Send + Sync + 'static>(&mut self, index: usize) -> Result<InstanceSet<R>, BoxError> {
        self.take::<InstanceSet<R>>(index).ok_or_else(|| self.missing(index))
    }

    fn missing(&self, index: usize) -> BoxError {
        format!("{} 的第 {} 个参数未注入", self.owner, index).into()
    }
}

/// 构造函数可见性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// 容器可调用
    Public,
    /// 容器不可调用
    Private,
}

/// 类型擦除后的构造函数
#[derive(Clone)]
pub struct ConstructorDescriptor {
    name: &'static str,
    injectable: bool,
    visibility: Visibility,
    params: Vec<Dependency>,
    invoke: Invoker,
}

impl ConstructorDescriptor {
    /// 名称
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 是否标记为可注入
    pub fn is_injectable(&self) -> bool {
        self.injectable
    }

    /// 可见性
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// 参数列表
    pub fn params(&self) -> &[Dependency] {
        &self.params
    }

    /// 调用入口，可移交到其他线程执行
    pub fn invoker(&self) -> Arc<dyn Fn(Args) -> Result<Instance, BoxError> + Send + Sync> {
        self.invoke.clone()
    }

    /// 直接调用
    pub fn invoke(&self, args: Args) -> Result<Instance, BoxError> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for ConstructorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDescriptor")
            .field("name", &self.name)
            .field("injectable", &self.injectable)
            .field("visibility", &self.visibility)
            .field("params", &self.params)
            .finish()
    }
}

/// 类型 `T` 的构造函数构建器
pub struct Constructor<T> {
    inner: ConstructorDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Constructor<T> {
    /// 创建构造函数
    pub fn new<F>(name: &'static str, f: F) -> Self
    where
        F: Fn(&mut Args) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let invoke: Invoker = Arc::new(move |mut args: Args| {
            f(&mut args).map(|value| Arc::new(value) as Instance)
        });
        Self {
            inner: ConstructorDescriptor {
                name,
                injectable: false,
                visibility: Visibility::Public,
                params: Vec::new(),
                invoke,
            },
            _marker: PhantomData,
        }
    }

    /// 标记为可注入构造函数，所有参数都参与解析
    pub fn inject(mut self) -> Self {
        self.inner.injectable = true;
        self
    }

    /// 标记为私有
    pub fn private(mut self) -> Self {
        self.inner.visibility = Visibility::Private;
        self
    }

    /// 追加参数
    pub fn param(mut self, dependency: Dependency) -> Self {
        self.inner.params.push(dependency);
        self
    }

    fn into_descriptor(self) -> ConstructorDescriptor {
        self.inner
    }
}

/// 字段描述
#[derive(Clone)]
pub struct FieldDescriptor {
    name: &'static str,
    value_type: TypeInfo,
    dependency: Dependency,
    inject: bool,
    mutable: bool,
    attributes: BTreeMap<String, String>,
    setter: Setter,
}

impl FieldDescriptor {
    /// 字段名
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 字段在 [`Injected`] 中保存的值类型
    pub fn value_type(&self) -> &TypeInfo {
        &self.value_type
    }

    /// 对应的依赖槽位
    pub fn dependency(&self) -> &Dependency {
        &self.dependency
    }

    /// 是否标记为注入点
    pub fn is_inject(&self) -> bool {
        self.inject
    }

    /// 是否可写
    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// 读取附加属性
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// 全部附加属性
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// 直接写入字段，绕过任何访问器
    pub fn assign(&self, instance: InstanceRef<'_>, value: BoxValue) -> Result<(), BoxError> {
        (self.setter)(instance, value)
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("inject", &self.inject)
            .field("mutable", &self.mutable)
            .field("attributes", &self.attributes)
            .finish()
    }
}

/// 类型 `T` 的字段构建器
pub struct Field<T> {
    inner: FieldDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Field<T> {
    /// 单值字段 `Injected<Arc<R>>`
    pub fn single<R: ?Sized + Send + Sync + 'static>(
        name: &'static str,
        cell: fn(&T) -> &Injected<Arc<R>>,
    ) -> Self {
        Self::build(name, Dependency::single::<R>(name), cell)
    }

    /// 列表字段 `Injected<Vec<Arc<R>>>`
    pub fn list<R: ?Sized + Send + Sync + 'static>(
        name: &'static str,
        cell: fn(&T) -> &Injected<Vec<Arc<R>>>,
    ) -> Self {
        Self::build(name, Dependency::list::<R>(name), cell)
    }

    /// 集合字段 `Injected<InstanceSet<R>>`
    pub fn set<R: ?Sized + Send + Sync + 'static>(
        name: &'static str,
        cell: fn(&T) -> &Injected<InstanceSet<R>>,
    ) -> Self {
        Self::build(name, Dependency::set::<R>(name), cell)
    }

    /// 普通值字段 `Injected<V>`，由字段适配器负责填充
    pub fn value<V: Send + Sync + 'static>(name: &'static str, cell: fn(&T) -> &Injected<V>) -> Self {
        Self::build(name, Dependency::single::<V>(name), cell)
    }

    fn build<S: Send + Sync + 'static>(
        name: &'static str,
        dependency: Dependency,
        cell: fn(&T) -> &Injected<S>,
    ) -> Self {
        let setter: Setter = Arc::new(move |instance: InstanceRef<'_>, value: BoxValue| {
            let owner = instance
                .downcast_ref::<T>()
                .ok_or_else(|| BoxError::from(format!("实例不是 {}", std::any::type_name::<T>())))?;
            let value = value.downcast::<S>().map_err(|_| {
                BoxError::from(format!("字段 {} 需要 {}", name, std::any::type_name::<S>()))
            })?;
            cell(owner).set(*value);
            Ok(())
        });
        Self {
            inner: FieldDescriptor {
                name,
                value_type: TypeInfo::of::<S>(),
                dependency,
                inject: false,
                mutable: true,
                attributes: BTreeMap::new(),
                setter,
            },
            _marker: PhantomData,
        }
    }

    /// 标记为注入点
    pub fn inject(mut self) -> Self {
        self.inner.inject = true;
        self.inner.dependency = self.inner.dependency.inject();
        self
    }

    /// 设置限定符
    pub fn named(mut self, qualifier: impl Into<String>) -> Self {
        self.inner.dependency = self.inner.dependency.named(qualifier);
        self
    }

    /// 标记为不可变，容器不会直接写入
    pub fn immutable(mut self) -> Self {
        self.inner.mutable = false;
        self
    }

    /// 附加属性，供字段适配器判断
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.attributes.insert(key.into(), value.into());
        self
    }
}

/// 方法描述
#[derive(Clone)]
pub struct MethodDescriptor {
    name: &'static str,
    inject: bool,
    params: Vec<Dependency>,
    invoke: MethodInvoker,
}

impl MethodDescriptor {
    /// 方法名
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 是否标记为注入方法
    pub fn is_inject(&self) -> bool {
        self.inject
    }

    /// 参数列表
    pub fn params(&self) -> &[Dependency] {
        &self.params
    }

    /// 调用方法
    pub fn invoke(&self, instance: InstanceRef<'_>, args: Args) -> Result<(), BoxError> {
        (self.invoke)(instance, args)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("inject", &self.inject)
            .field("params", &self.params)
            .finish()
    }
}

/// 类型 `T` 的方法构建器
pub struct Method<T> {
    inner: MethodDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Method<T> {
    /// 创建方法
    pub fn new<F>(name: &'static str, f: F) -> Self
    where
        F: Fn(&T, &mut Args) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let invoke: MethodInvoker = Arc::new(move |instance: InstanceRef<'_>, mut args: Args| {
            let owner = instance
                .downcast_ref::<T>()
                .ok_or_else(|| BoxError::from(format!("实例不是 {}", std::any::type_name::<T>())))?;
            f(owner, &mut args)
        });
        Self {
            inner: MethodDescriptor {
                name,
                inject: false,
                params: Vec::new(),
                invoke,
            },
            _marker: PhantomData,
        }
    }

    /// 标记为注入方法
    pub fn inject(mut self) -> Self {
        self.inner.inject = true;
        self
    }

    /// 追加参数
    pub fn param(mut self, dependency: Dependency) -> Self {
        self.inner.params.push(dependency);
        self
    }
}

/// 无参数的构造后钩子
#[derive(Clone)]
pub struct HookDescriptor {
    name: &'static str,
    invoke: HookFn,
}

impl HookDescriptor {
    /// 钩子名
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 调用钩子
    pub fn invoke(&self, instance: InstanceRef<'_>) -> Result<(), BoxError> {
        (self.invoke)(instance)
    }
}

impl fmt::Debug for HookDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookDescriptor").field("name", &self.name).finish()
    }
}

/// 类型层次中的一层成员
#[derive(Debug, Clone)]
pub struct MemberLevel {
    owner: TypeInfo,
    fields: Vec<FieldDescriptor>,
    methods: Vec<MethodDescriptor>,
    post_construct: Vec<HookDescriptor>,
}

impl MemberLevel {
    fn new(owner: TypeInfo) -> Self {
        Self {
            owner,
            fields: Vec::new(),
            methods: Vec::new(),
            post_construct: Vec::new(),
        }
    }

    /// 声明这一层成员的类型
    pub fn owner(&self) -> &TypeInfo {
        &self.owner
    }

    /// 字段
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// 方法
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// 构造后钩子
    pub fn post_construct(&self) -> &[HookDescriptor] {
        &self.post_construct
    }

    fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.methods.is_empty() && self.post_construct.is_empty()
    }

    /// 把基类层的成员映射到派生类型 `T` 上
    fn project<T, B>(&self, project: fn(&T) -> &B) -> Self
    where
        T: Send + Sync + 'static,
        B: Send + Sync + 'static,
    {
        let fields = self
            .fields
            .iter()
            .map(|field| {
                let inner = field.setter.clone();
                let setter: Setter = Arc::new(move |instance: InstanceRef<'_>, value: BoxValue| {
                    inner(project(downcast_owner::<T>(instance)?), value)
                });
                FieldDescriptor {
                    setter,
                    ..field.clone()
                }
            })
            .collect();
        let methods = self
            .methods
            .iter()
            .map(|method| {
                let inner = method.invoke.clone();
                let invoke: MethodInvoker = Arc::new(move |instance: InstanceRef<'_>, args: Args| {
                    inner(project(downcast_owner::<T>(instance)?), args)
                });
                MethodDescriptor {
                    invoke,
                    ..method.clone()
                }
            })
            .collect();
        let post_construct = self
            .post_construct
            .iter()
            .map(|hook| {
                let inner = hook.invoke.clone();
                let invoke: HookFn = Arc::new(move |instance: InstanceRef<'_>| {
                    inner(project(downcast_owner::<T>(instance)?))
                });
                HookDescriptor {
                    name: hook.name,
                    invoke,
                }
            })
            .collect();
        Self {
            owner: self.owner,
            fields,
            methods,
            post_construct,
        }
    }
}

fn downcast_owner<T: 'static>(instance: InstanceRef<'_>) -> Result<&T, BoxError> {
    instance
        .downcast_ref::<T>()
        .ok_or_else(|| BoxError::from(format!("实例不是 {}", std::any::type_name::<T>())))
}

/// 类型描述符
#[derive(Clone)]
pub struct TypeDescriptor {
    info: TypeInfo,
    component: bool,
    singleton: bool,
    prototype: bool,
    primary: bool,
    qualifier: String,
    implemented_by: Option<TypeInfo>,
    supertypes: Vec<TypeInfo>,
    casters: HashMap<TypeId, Caster>,
    constructors: Vec<ConstructorDescriptor>,
    levels: Vec<MemberLevel>,
    initializer: Option<AsyncHook>,
    disposer: Option<AsyncHook>,
}

impl TypeDescriptor {
    /// 描述一个具体类型
    pub fn of<T: Send + Sync + 'static>() -> DescriptorBuilder<T> {
        let mut builder = DescriptorBuilder::empty();
        let identity: Caster = Arc::new(|instance: Instance| {
            instance
                .downcast::<T>()
                .ok()
                .map(|value| Box::new(value) as BoxValue)
        });
        builder.descriptor.casters.insert(TypeId::of::<T>(), identity);
        builder
    }

    /// 描述一个抽象类型（`dyn Trait`）
    pub fn abstract_of<T: ?Sized + 'static>() -> DescriptorBuilder<T> {
        DescriptorBuilder::empty()
    }

    /// 被描述的类型
    pub fn type_info(&self) -> &TypeInfo {
        &self.info
    }

    /// 是否标记为组件，可被实现发现直接选中
    pub fn is_component(&self) -> bool {
        self.component
    }

    /// 是否标记为单例
    pub fn is_singleton(&self) -> bool {
        self.singleton
    }

    /// 是否显式声明为原型（每次解析都新建）
    pub fn is_prototype(&self) -> bool {
        self.prototype
    }

    /// 是否标记为主实现
    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// 声明的限定符
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    /// 抽象类型声明的默认实现
    pub fn implemented_by(&self) -> Option<&TypeInfo> {
        self.implemented_by.as_ref()
    }

    /// 可向上转换到的抽象类型
    pub fn supertypes(&self) -> &[TypeInfo] {
        &self.supertypes
    }

    /// 是否能转换为目标类型
    pub fn can_cast_to(&self, target: &TypeInfo) -> bool {
        self.casters.contains_key(&target.id())
    }

    /// 转换实例，得到 `Box<Arc<R>>`
    pub fn cast(&self, instance: Instance, target: &TypeInfo) -> Option<BoxValue> {
        self.casters.get(&target.id()).and_then(|caster| caster(instance))
    }

    /// 构造函数
    pub fn constructors(&self) -> &[ConstructorDescriptor] {
        &self.constructors
    }

    /// 成员层级，基类在前
    pub fn levels(&self) -> &[MemberLevel] {
        &self.levels
    }

    /// 异步初始化钩子
    pub fn initializer(&self) -> Option<&AsyncHook> {
        self.initializer.as_ref()
    }

    /// 释放钩子
    pub fn disposer(&self) -> Option<&AsyncHook> {
        self.disposer.as_ref()
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type", &self.info)
            .field("component", &self.component)
            .field("singleton", &self.singleton)
            .field("prototype", &self.prototype)
            .field("primary", &self.primary)
            .field("qualifier", &self.qualifier)
            .field("implemented_by", &self.implemented_by)
            .field("supertypes", &self.supertypes)
            .field("constructors", &self.constructors.len())
            .field("levels", &self.levels.len())
            .finish()
    }
}

/// 能提供自身描述符的类型
pub trait Describe: Send + Sync + 'static {
    /// 生成描述符
    fn descriptor() -> TypeDescriptor;
}

/// 描述符构建器
pub struct DescriptorBuilder<T: ?Sized> {
    descriptor: TypeDescriptor,
    own: Option<MemberLevel>,
    _marker: PhantomData<fn() -> Box<T>>,
}

impl<T: ?Sized + 'static> DescriptorBuilder<T> {
    fn empty() -> Self {
        let info = TypeInfo::of::<T>();
        Self {
            descriptor: TypeDescriptor {
                info,
                component: false,
                singleton: false,
                prototype: false,
                primary: false,
                qualifier: String::new(),
                implemented_by: None,
                supertypes: Vec::new(),
                casters: HashMap::new(),
                constructors: Vec::new(),
                levels: Vec::new(),
                initializer: None,
                disposer: None,
            },
            own: Some(MemberLevel::new(info)),
            _marker: PhantomData,
        }
    }

    /// 标记为组件
    pub fn component(mut self) -> Self {
        self.descriptor.component = true;
        self
    }

    /// 标记为单例
    pub fn singleton(mut self) -> Self {
        self.descriptor.singleton = true;
        self
    }

    /// 声明为原型，关闭默认单例
    pub fn prototype(mut self) -> Self {
        self.descriptor.prototype = true;
        self
    }

    /// 标记为主实现
    pub fn primary(mut self) -> Self {
        self.descriptor.primary = true;
        self
    }

    /// 声明限定符
    pub fn named(mut self, qualifier: impl Into<String>) -> Self {
        self.descriptor.qualifier = qualifier.into();
        self
    }

    /// 声明默认实现
    pub fn implemented_by<I: ?Sized + 'static>(mut self) -> Self {
        self.descriptor.implemented_by = Some(TypeInfo::of::<I>());
        self
    }

    /// 声明父抽象类型，例如 `dyn Sub` 的 `dyn Super`
    ///
    /// 只影响可赋值性判断，实例转换仍由具体类型的 `provides` 完成。
    pub fn extends_abstract<S: ?Sized + 'static>(mut self) -> Self {
        let target = TypeInfo::of::<S>();
        if !self.descriptor.supertypes.contains(&target) {
            self.descriptor.supertypes.push(target);
        }
        self
    }

    /// 完成构建
    pub fn build(mut self) -> TypeDescriptor {
        if let Some(own) = self.own.take() {
            if !own.is_empty() {
                self.descriptor.levels.push(own);
            }
        }
        self.descriptor
    }

    fn own_level(&mut self) -> &mut MemberLevel {
        let info = self.descriptor.info;
        self.own.get_or_insert_with(|| MemberLevel::new(info))
    }
}

impl<T: Send + Sync + 'static> DescriptorBuilder<T> {
    /// 声明 `T` 可以作为 `R` 使用
    pub fn provides<R: ?Sized + Send + Sync + 'static>(mut self, upcast: fn(Arc<T>) -> Arc<R>) -> Self {
        let caster: Caster = Arc::new(move |instance: Instance| {
            instance
                .downcast::<T>()
                .ok()
                .map(|value| Box::new(upcast(value)) as BoxValue)
        });
        let target = TypeInfo::of::<R>();
        if !self.descriptor.supertypes.contains(&target) {
            self.descriptor.supertypes.push(target);
        }
        self.descriptor.casters.insert(target.id(), caster);
        self
    }

    /// 追加构造函数
    pub fn constructor(mut self, constructor: Constructor<T>) -> Self {
        self.descriptor.constructors.push(constructor.into_descriptor());
        self
    }

    /// 以 `Default` 作为无参构造函数
    pub fn default_constructor(self) -> Self
    where
        T: Default,
    {
        self.constructor(Constructor::new("default", |_| Ok(T::default())))
    }

    /// 追加字段
    pub fn field(mut self, field: Field<T>) -> Self {
        self.own_level().fields.push(field.inner);
        self
    }

    /// 追加方法
    pub fn method(mut self, method: Method<T>) -> Self {
        self.own_level().methods.push(method.inner);
        self
    }

    /// 追加构造后钩子
    pub fn post_construct<F>(mut self, name: &'static str, hook: F) -> Self
    where
        F: Fn(&T) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let invoke: HookFn = Arc::new(move |instance: InstanceRef<'_>| hook(downcast_owner::<T>(instance)?));
        self.own_level().post_construct.push(HookDescriptor { name, invoke });
        self
    }

    /// 继承基类型 `B` 的成员层级，`project` 返回嵌入的基类部分
    ///
    /// 基类层级排在当前类型之前。
    pub fn extends<B: Send + Sync + 'static>(mut self, base: &TypeDescriptor, project: fn(&T) -> &B) -> Self {
        let inherited = base.levels.iter().map(|level| level.project::<T, B>(project));
        self.descriptor.levels.extend(inherited);
        self
    }

    /// 声明异步初始化能力
    pub fn initializing(mut self) -> Self
    where
        T: AsyncInitializing,
    {
        let hook: AsyncHook = Arc::new(|instance: Instance| {
            Box::pin(async move {
                let value = instance
                    .downcast::<T>()
                    .map_err(|_| BoxError::from(format!("实例不是 {}", std::any::type_name::<T>())))?;
                value.after_properties_set().await
            })
        });
        self.descriptor.initializer = Some(hook);
        self
    }

    /// 声明释放能力
    pub fn disposable(mut self) -> Self
    where
        T: Disposable,
    {
        let hook: AsyncHook = Arc::new(|instance: Instance| {
            Box::pin(async move {
                let value = instance
                    .downcast::<T>()
                    .map_err(|_| BoxError::from(format!("实例不是 {}", std::any::type_name::<T>())))?;
                value.dispose().await
            })
        });
        self.descriptor.disposer = Some(hook);
        self
    }
}
