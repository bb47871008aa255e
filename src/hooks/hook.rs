//! Hook contract.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::http::{Request, Response};

/// Outcome of a hook: `Some(response)` short-circuits.
pub type HookResult = Result<Option<Response>, HandlerError>;

/// Which route a hook is wrapping.
#[derive(Debug, Clone, Copy)]
pub struct HookScope<'a> {
    /// Name of the router that owns the route.
    pub router: &'a str,
    /// Name of the matched handler.
    pub handler: &'a str,
}

/// Interceptor run before the handler.
#[async_trait]
pub trait PreHook: Send + Sync {
    async fn pre(&self, scope: HookScope<'_>, req: &mut Request) -> HookResult;
}

/// Interceptor run after the handler.
///
/// May edit the response in place or return a replacement.
#[async_trait]
pub trait PostHook: Send + Sync {
    async fn post(&self, scope: HookScope<'_>, req: &mut Request, res: &mut Response) -> HookResult;
}

pub struct PreFn<F> {
    f: F,
}

#[async_trait]
impl<F> PreHook for PreFn<F>
where
    F: Fn(HookScope<'_>, &mut Request) -> HookResult + Send + Sync,
{
    async fn pre(&self, scope: HookScope<'_>, req: &mut Request) -> HookResult {
        (self.f)(scope, req)
    }
}

/// Wrap a synchronous closure as a [`PreHook`].
pub fn pre_fn<F>(f: F) -> PreFn<F>
where
    F: Fn(HookScope<'_>, &mut Request) -> HookResult + Send + Sync,
{
    PreFn { f }
}

pub struct PostFn<F> {
    f: F,
}

#[async_trait]
impl<F> PostHook for PostFn<F>
where
    F: Fn(HookScope<'_>, &mut Request, &mut Response) -> HookResult + Send + Sync,
{
    async fn post(&self, scope: HookScope<'_>, req: &mut Request, res: &mut Response) -> HookResult {
        (self.f)(scope, req, res)
    }
}

/// Wrap a synchronous closure as a [`PostHook`].
pub fn post_fn<F>(f: F) -> PostFn<F>
where
    F: Fn(HookScope<'_>, &mut Request, &mut Response) -> HookResult + Send + Sync,
{
    PostFn { f }
}

/// A prioritized pair of optional interceptors.
///
/// Higher priority runs first, in both phases.
#[derive(Clone)]
pub struct Hook {
    name: Arc<str>,
    priority: i32,
    pre: Option<Arc<dyn PreHook>>,
    post: Option<Arc<dyn PostHook>>,
}

impl Hook {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            priority: 0,
            pre: None,
            post: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_pre(mut self, pre: impl PreHook + 'static) -> Self {
        self.pre = Some(Arc::new(pre));
        self
    }

    pub fn with_post(mut self, post: impl PostHook + 'static) -> Self {
        self.post = Some(Arc::new(post));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn pre(&self) -> Option<&Arc<dyn PreHook>> {
        self.pre.as_ref()
    }

    pub fn post(&self) -> Option<&Arc<dyn PostHook>> {
        self.post.as_ref()
    }

    /// A hook with neither interceptor does nothing and is not loaded.
    pub fn is_usable(&self) -> bool {
        self.pre.is_some() || self.post.is_some()
    }
}

impl std::fmt::Debug for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hook")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("pre", &self.pre.is_some())
            .field("post", &self.post.is_some())
            .finish()
    }
}

/// Sort hooks by descending priority, keeping discovery order for ties.
pub fn sort_by_priority(hooks: &mut [Hook]) {
    hooks.sort_by(|a, b| b.priority.cmp(&a.priority));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_sort_is_stable() {
        let mut hooks = vec![
            Hook::new("a").with_priority(1),
            Hook::new("b").with_priority(10),
            Hook::new("c"),
            Hook::new("d").with_priority(10),
            Hook::new("e").with_priority(1),
        ];
        sort_by_priority(&mut hooks);

        let order: Vec<_> = hooks.iter().map(Hook::name).collect();
        assert_eq!(order, vec!["b", "d", "a", "e", "c"]);
    }

    #[test]
    fn test_usable_requires_an_interceptor() {
        assert!(!Hook::new("empty").is_usable());
        assert!(Hook::new("pre")
            .with_pre(pre_fn(|_scope, _req: &mut Request| Ok(None)))
            .is_usable());
        assert!(Hook::new("post")
            .with_post(post_fn(|_scope, _req: &mut Request, _res: &mut Response| Ok(None)))
            .is_usable());
        assert_eq!(Hook::new("default").priority(), 0);
    }
}
