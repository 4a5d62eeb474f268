//! Object pooling
//!
//! Free-list recycling for objects that are expensive to construct.

mod object_pool;

pub use object_pool::ObjectPool;
