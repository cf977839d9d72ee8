//! 容器单元测试

mod injector_tests;
mod lifecycle_tests;
