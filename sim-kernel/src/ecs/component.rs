// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Component and resource traits
//!
//! Components are data attached to entities; resources are singletons that
//! belong to no entity. Both are identified by their concrete Rust type: the
//! store, the query engine and the downcasts all key on `TypeId::of::<T>()`.
//! [`TypeTag`] exposes the same id on a value and cannot be overridden.
//!
//! Values are stored behind `Arc` so that readers can take snapshots out of
//! the store without holding its lock. Shared mutable state inside a
//! component or resource should use interior mutability.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Trait that all components must implement
///
/// Components should be plain data structures without behavior.
pub trait Component: Any + Send + Sync {}

/// Trait that all resources must implement
pub trait Resource: Any + Send + Sync {}

/// Runtime type identity of a value
///
/// Implemented for every `'static` type and for nothing else, so the tag of
/// a value always equals [`tag_of`] for its type. Calling it on an `Arc<C>`
/// yields the tag of the `Arc`, not of `C`.
///
/// A type cannot supply its own identity:
///
/// ```compile_fail
/// use std::any::TypeId;
/// use sim_kernel::ecs::TypeTag;
///
/// struct Spoofed;
/// impl TypeTag for Spoofed {
///     fn type_tag(&self) -> TypeId {
///         TypeId::of::<u32>()
///     }
/// }
/// ```
pub trait TypeTag {
    /// Tag of the concrete type of `self`
    fn type_tag(&self) -> TypeId;
}

impl<T: Any> TypeTag for T {
    fn type_tag(&self) -> TypeId {
        TypeId::of::<T>()
    }
}

/// Type tag of a component or resource type
pub fn tag_of<T: Any>() -> TypeId {
    TypeId::of::<T>()
}

/// Type-erased, shared handle to a stored component
#[derive(Clone)]
pub struct ComponentRef {
    tag: TypeId,
    value: Arc<dyn Any + Send + Sync>,
}

impl ComponentRef {
    pub(crate) fn new<C: Component>(component: C) -> Self {
        ComponentRef {
            tag: tag_of::<C>(),
            value: Arc::new(component),
        }
    }

    /// Type tag of the stored component
    pub fn tag(&self) -> TypeId {
        self.tag
    }

    /// Check whether the component is a `C`
    pub fn is<C: Component>(&self) -> bool {
        self.value.is::<C>()
    }

    /// Borrow the component as a `C`
    pub fn downcast_ref<C: Component>(&self) -> Option<&C> {
        self.value.downcast_ref::<C>()
    }

    /// Get a shared `Arc<C>` to the component
    pub fn downcast<C: Component>(&self) -> Option<Arc<C>> {
        Arc::clone(&self.value).downcast::<C>().ok()
    }
}

impl fmt::Debug for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRef").field("tag", &self.tag).finish()
    }
}

/// Downcast every component in `components` to `C`
///
/// Returns `None` as soon as one of them is a different type.
pub fn downcast_all<C: Component>(components: &[ComponentRef]) -> Option<Vec<Arc<C>>> {
    components.iter().map(ComponentRef::downcast::<C>).collect()
}
