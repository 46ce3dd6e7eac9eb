//! # Render session
//!
//! One `RenderSession` exists per render pass. It owns everything the block
//! renderers need to resolve expressions:
//!
//! - the global namespaces (`this`, `site`, `user`, `url`, `options`), built
//!   lazily from the host environment and cached until [`invalidate`]d
//! - the current component frame, whose props shadow any outer props
//! - the loop frame stack, innermost binding first
//! - parsed templates, reused for repeated sources within the pass
//!
//! Scopes are entered through guards. Dropping the guard restores the scope
//! that was active before, on every exit path.
//!
//! [`invalidate`]: RenderSession::invalidate

use crate::evaluator::{self, Scope};
use crate::host::{global_namespaces, Host};
use crate::renderer::Renderer;
use crate::value::{Map, Value};
use crate::EtchConfig;
use etch_common::Block;
use etch_parser::{parse_template, Template};
use serde_json::Value as Json;
use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;
use tracing::warn;

/// An instantiated component: its resolved props, the slot contents supplied
/// at the call site, and the scope of that call site
#[derive(Debug)]
pub struct ComponentFrame {
    pub pattern_id: String,
    pub props: Value,
    pub slots: HashMap<String, Rc<[Block]>>,
    pub caller: RenderScope,
}

#[derive(Debug, Clone, Default)]
pub struct LoopFrame {
    pub bindings: Map,
}

/// The component and loop frames visible at one point of the render
#[derive(Debug, Clone, Default)]
pub struct RenderScope {
    pub component: Option<Rc<ComponentFrame>>,
    pub loops: Vec<Rc<LoopFrame>>,
}

pub struct RenderSession<'r> {
    renderer: &'r Renderer,
    global: OnceCell<Map>,
    scope: RenderScope,
    component_stack: Vec<String>,
    templates: RefCell<HashMap<String, Rc<Template>>>,
}

impl<'r> RenderSession<'r> {
    pub fn new(renderer: &'r Renderer) -> Self {
        Self {
            renderer,
            global: OnceCell::new(),
            scope: RenderScope::default(),
            component_stack: Vec::new(),
            templates: RefCell::new(HashMap::new()),
        }
    }

    pub fn renderer(&self) -> &'r Renderer {
        self.renderer
    }

    pub fn host(&self) -> &'r Host {
        self.renderer.host()
    }

    pub fn config(&self) -> &'r EtchConfig {
        self.renderer.config()
    }

    /// Global namespaces, built on first use
    pub fn global(&self) -> &Map {
        self.global
            .get_or_init(|| global_namespaces(self.renderer.host().environment.as_ref()))
    }

    /// Drop the cached global namespaces so the next lookup rebuilds them
    pub fn invalidate(&mut self) {
        self.global = OnceCell::new();
    }

    pub fn scope(&self) -> &RenderScope {
        &self.scope
    }

    /// Props of the current component, if any
    pub fn current_props(&self) -> Option<&Value> {
        self.scope.component.as_ref().map(|frame| &frame.props)
    }

    pub fn component_depth(&self) -> usize {
        self.component_stack.len()
    }

    pub fn component_stack(&self) -> &[String] {
        &self.component_stack
    }

    /// Slot content supplied for `name` by the current component's call site
    pub fn slot_content(&self, name: &str) -> Option<Rc<[Block]>> {
        if name.is_empty() {
            return None;
        }
        self.scope
            .component
            .as_ref()
            .and_then(|frame| frame.slots.get(name).cloned())
    }

    /// Make a component current. Returns `None` when the nesting limit is
    /// reached.
    pub fn enter_component(
        &mut self,
        pattern_id: impl Into<String>,
        props: Value,
        slots: HashMap<String, Rc<[Block]>>,
    ) -> Option<ScopeGuard<'_, 'r>> {
        let pattern_id = pattern_id.into();
        let limit = self.config().max_component_depth;

        if self.component_stack.len() >= limit {
            let mut call_stack = self.component_stack.clone();
            call_stack.push(pattern_id.clone());
            warn!(
                component = %pattern_id,
                limit,
                call_stack = %call_stack.join(" → "),
                "Component nesting limit reached"
            );
            return None;
        }

        let saved = self.scope.clone();
        let frame = ComponentFrame {
            pattern_id: pattern_id.clone(),
            props,
            slots,
            caller: saved.clone(),
        };
        self.scope.component = Some(Rc::new(frame));
        self.component_stack.push(pattern_id);

        Some(ScopeGuard {
            session: self,
            saved: Some(saved),
            pops_component: true,
        })
    }

    /// Push one loop iteration's bindings
    pub fn enter_loop(&mut self, bindings: Map) -> ScopeGuard<'_, 'r> {
        let saved = self.scope.clone();
        self.scope.loops.push(Rc::new(LoopFrame { bindings }));
        ScopeGuard {
            session: self,
            saved: Some(saved),
            pops_component: false,
        }
    }

    /// Switch to the scope of the current component's call site. Returns
    /// `None` outside of any component.
    pub fn enter_slot(&mut self) -> Option<ScopeGuard<'_, 'r>> {
        let caller = self.scope.component.as_ref()?.caller.clone();
        let saved = std::mem::replace(&mut self.scope, caller);
        Some(ScopeGuard {
            session: self,
            saved: Some(saved),
            pops_component: false,
        })
    }

    pub fn render_blocks(&mut self, blocks: &[Block]) -> String {
        let mut output = String::new();
        for block in blocks {
            output.push_str(&self.render_block(block));
        }
        output
    }

    pub fn render_block(&mut self, block: &Block) -> String {
        let renderer = self.renderer;
        renderer.registry().render(block, self)
    }

    /// Evaluate a template string in the current scope
    pub fn resolve(&self, source: &str) -> Value {
        self.resolve_in(source, self)
    }

    /// Evaluate a template string against another scope, reusing the
    /// session's template cache
    pub fn resolve_in(&self, source: &str, scope: &dyn Scope) -> Value {
        if !source.contains('{') {
            return Value::String(source.to_string());
        }
        evaluator::evaluate_template(&self.template(source), scope)
    }

    /// Parsed template for `source`. The cache is dropped with the session.
    pub(crate) fn template(&self, source: &str) -> Rc<Template> {
        if let Some(template) = self.templates.borrow().get(source) {
            return Rc::clone(template);
        }
        let template = Rc::new(parse_template(source));
        self.templates
            .borrow_mut()
            .insert(source.to_string(), Rc::clone(&template));
        template
    }

    #[cfg(test)]
    fn cached_templates(&self) -> usize {
        self.templates.borrow().len()
    }

    pub fn resolve_string(&self, source: &str) -> String {
        self.resolve(source).to_string()
    }

    /// Attribute values: strings are evaluated, everything else converts as is
    pub fn resolve_json(&self, value: &Json) -> Value {
        match value {
            Json::String(s) => self.resolve(s),
            other => Value::from_json(other),
        }
    }
}

impl Scope for RenderSession<'_> {
    fn lookup(&self, root: &str) -> Option<&Value> {
        for frame in self.scope.loops.iter().rev() {
            if let Some(value) = frame.bindings.get(root) {
                return Some(value);
            }
        }

        if root == "props" {
            return self.current_props();
        }

        self.global().get(root)
    }
}

/// Restores the scope captured on entry when dropped
pub struct ScopeGuard<'s, 'r> {
    session: &'s mut RenderSession<'r>,
    saved: Option<RenderScope>,
    pops_component: bool,
}

impl<'r> Deref for ScopeGuard<'_, 'r> {
    type Target = RenderSession<'r>;

    fn deref(&self) -> &Self::Target {
        self.session
    }
}

impl DerefMut for ScopeGuard<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.session
    }
}

impl Drop for ScopeGuard<'_, '_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.session.scope = saved;
        }
        if self.pops_component {
            self.session.component_stack.pop();
        }
    }
}
