//! Middleware resolution.

use std::sync::Arc;

use crate::error::Error;
use crate::middleware::Middleware;

use super::Context;

/// Collects middleware from the root down and reverses the result.
///
/// A definition returning `None` drops everything registered above it. The
/// returned list starts with the most specific middleware, which ends up
/// closest to the connection once the list is stacked.
pub fn resolve(cx: &Context<'_>) -> Result<Vec<Arc<dyn Middleware>>, Error> {
    cx.track("middleware", || {
        let mut stack: Vec<Arc<dyn Middleware>> = Vec::new();
        for node in cx.lineage() {
            let Some(thunk) = node.definitions().middleware() else {
                continue;
            };
            match thunk(cx.settings)? {
                Some(middleware) => stack.extend(middleware),
                None => stack.clear(),
            }
        }
        stack.reverse();
        Ok(stack)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Connection;
    use crate::middleware::from_fn;
    use crate::resolver::testing::{settings, two_levels};
    use serde_json::json;

    fn named(name: &str) -> Arc<dyn Middleware> {
        from_fn(name, |request, next| next.call(request))
    }

    fn names(stack: &[Arc<dyn Middleware>]) -> Vec<&str> {
        stack.iter().map(|m| m.name()).collect()
    }

    #[test]
    fn test_leaf_middleware_comes_first() {
        let (schema, op) = two_levels(
            |root| {
                root.middleware([named("foo"), named("bar")]);
                Ok(())
            },
            |op| {
                op.middleware([named("baz")]);
                Ok(())
            },
        );
        let settings = settings(&schema, op, json!({}));
        let stack = resolve(&Context::new(&schema, op, &settings)).unwrap();
        assert_eq!(names(&stack), vec!["baz", "bar", "foo"]);
    }

    #[test]
    fn test_none_resets_everything_above() {
        let (schema, op) = two_levels(
            |root| {
                root.middleware([named("foo"), named("bar")]);
                Ok(())
            },
            |op| {
                op.clear_middleware();
                Ok(())
            },
        );
        let settings = settings(&schema, op, json!({}));
        assert!(resolve(&Context::new(&schema, op, &settings)).unwrap().is_empty());
    }

    #[test]
    fn test_conditional_middleware() {
        let (schema, op) = two_levels(
            |root| {
                root.option("debug", crate::settings::OptionDef::boolean().default(false))?
                    .middleware_with(|s| {
                        let mut list = vec![named("auth")];
                        if s.value::<bool>("debug")? {
                            list.push(named("dump"));
                        }
                        Ok(Some(list))
                    });
                Ok(())
            },
            |_| Ok(()),
        );
        let settings = settings(&schema, op, json!({"debug": true}));
        let stack = resolve(&Context::new(&schema, op, &settings)).unwrap();
        assert_eq!(names(&stack), vec!["dump", "auth"]);
    }
}
