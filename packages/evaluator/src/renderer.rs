use crate::blocks::{BlockKind, BlockRenderer, RendererRegistry};
use crate::config::EtchConfig;
use crate::context::RenderSession;
use crate::host::{Host, HtmlSanitizer};
use crate::loops::LoopHandlerManager;
use crate::sanitizer::AllowListSanitizer;
use etch_common::{Block, CommonResult};
use tracing::{debug, instrument};

/// Renders block trees against a host.
///
/// The renderer itself holds no per-request state. Every call to
/// [`render`](Self::render) runs in a fresh [`RenderSession`], so the global
/// context and the parsed-template cache are rebuilt each time.
pub struct Renderer {
    host: Host,
    config: EtchConfig,
    registry: RendererRegistry,
    loop_handlers: LoopHandlerManager,
    sanitizer: Box<dyn HtmlSanitizer>,
}

impl Renderer {
    pub fn new(host: Host) -> Self {
        Self::with_config(host, EtchConfig::default())
    }

    pub fn with_config(mut host: Host, config: EtchConfig) -> Self {
        let sanitizer = host
            .sanitizer
            .take()
            .unwrap_or_else(|| Box::new(AllowListSanitizer::new(&config.sanitizer)));

        Self {
            loop_handlers: LoopHandlerManager::new(config.loop_option_name.clone()),
            registry: RendererRegistry::new(),
            sanitizer,
            host,
            config,
        }
    }

    /// Replace the renderer used for one kind of block
    pub fn register(&mut self, kind: BlockKind, renderer: impl BlockRenderer + 'static) {
        self.registry.register(kind, renderer);
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn config(&self) -> &EtchConfig {
        &self.config
    }

    pub fn registry(&self) -> &RendererRegistry {
        &self.registry
    }

    pub fn loop_handlers(&self) -> &LoopHandlerManager {
        &self.loop_handlers
    }

    pub fn loop_handlers_mut(&mut self) -> &mut LoopHandlerManager {
        &mut self.loop_handlers
    }

    pub fn sanitizer(&self) -> &dyn HtmlSanitizer {
        self.sanitizer.as_ref()
    }

    pub fn session(&self) -> RenderSession<'_> {
        RenderSession::new(self)
    }

    /// Render a top-level block list
    #[instrument(skip(self, blocks), fields(blocks = blocks.len()))]
    pub fn render(&self, blocks: &[Block]) -> String {
        let output = self.session().render_blocks(blocks);
        debug!(bytes = output.len(), "Render complete");
        output
    }

    /// Render blocks given as the host parser's JSON output
    pub fn render_json(&self, source: &str) -> CommonResult<String> {
        let blocks = Block::list_from_str(source)?;
        Ok(self.render(&blocks))
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Host::default())
    }
}
