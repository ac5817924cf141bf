use super::config::SortableConfig;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindOutcome {
    /// First binding of this container: the caller must attach listeners.
    Attached,
    /// The container was already bound; only its configuration changed.
    Updated,
}

struct Binding<C> {
    container: C,
    config: Rc<SortableConfig<C>>,
}

/// Container identity → typed sortable configuration.
///
/// A container present here already has its pointer listener attached, so
/// rebinding only swaps the configuration.
pub struct Registry<C> {
    bindings: Vec<Binding<C>>,
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self { bindings: vec![] }
    }
}

impl<C: Clone + PartialEq> Registry<C> {
    pub fn bind(&mut self, container: C, config: SortableConfig<C>) -> BindOutcome {
        let config = Rc::new(config);
        if let Some(b) = self.bindings.iter_mut().find(|b| b.container == container) {
            b.config = config;
            return BindOutcome::Updated;
        }
        self.bindings.push(Binding { container, config });
        BindOutcome::Attached
    }

    pub fn config(&self, container: &C) -> Option<Rc<SortableConfig<C>>> {
        self.bindings
            .iter()
            .find(|b| &b.container == container)
            .map(|b| b.config.clone())
    }

    pub fn is_bound(&self, container: &C) -> bool {
        self.bindings.iter().any(|b| &b.container == container)
    }

    /// Whether `candidate` is bound with the same item/handle selectors as `config`.
    pub fn accepts(&self, candidate: &C, config: &SortableConfig<C>) -> bool {
        self.bindings
            .iter()
            .any(|b| &b.container == candidate && b.config.shares_selectors(config))
    }

    /// Drop bindings whose container fails `keep`; returns the removed containers.
    pub fn prune(&mut self, keep: impl Fn(&C) -> bool) -> Vec<C> {
        let mut removed = vec![];
        self.bindings.retain(|b| {
            if keep(&b.container) {
                true
            } else {
                removed.push(b.container.clone());
                false
            }
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
