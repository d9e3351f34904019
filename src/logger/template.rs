//! Compiled template table, one request/response pair per level.
//!
//! # Design Decisions
//! - Template text is a fixed constant table, compiled once at construction
//! - A compile failure is returned from construction and never deferred to
//!   request time
//! - Each level gets its own `Tera` instance holding a `request` and a
//!   `response` template
//! - Templates never redact; they render the headers their context carries

use std::collections::HashMap;
use tera::{Context, Tera};

use crate::error::{LoggerError, LoggerResult};
use crate::logger::context::{RequestContext, ResponseContext};
use crate::logger::helpers::register_filters;
use crate::logger::level::DetailLevel;

const REQUEST: &str = "request";
const RESPONSE: &str = "response";

macro_rules! minimal_request {
    () => {
        concat!(
            "  (request) {% if request_id %}[{{ request_id }}] {% endif %}",
            "{{ request.host }} {{ request.method }} {{ request.path }}\n",
        )
    };
}

macro_rules! minimal_response {
    () => {
        concat!(
            " (response) {% if request_id %}[{{ request_id }}] {% endif %}",
            "{{ response.status }} {{ response.status | status_text }}\n",
        )
    };
}

pub const MINIMAL_REQUEST: &str = minimal_request!();
pub const MINIMAL_RESPONSE: &str = minimal_response!();

pub const NORMAL_REQUEST: &str = concat!(
    minimal_request!(),
    "{{ request.headers | headers }}\n",
);

pub const NORMAL_RESPONSE: &str = concat!(
    minimal_response!(),
    "{{ response.headers | headers }}\n",
);

pub const VERBOSE_REQUEST: &str = concat!(
    minimal_request!(),
    "---------- BEGIN REQUEST ----------\n",
    "{{ request | dump }}\n",
    "----------  END  REQUEST ----------\n",
);

pub const VERBOSE_RESPONSE: &str = concat!(
    minimal_response!(),
    "========== BEGIN RESPONSE ==========\n",
    "{{ response.headers | headers }}\n",
    "{% if response.status | is_error %}{{ response.body }}{% endif %}\n",
    "==========  END  RESPONSE ==========\n",
);

pub const DEBUG_RESPONSE: &str = concat!(
    minimal_response!(),
    "========== BEGIN RESPONSE ==========\n",
    "{{ response.headers | headers }}\n",
    "{{ response.body }}\n",
    "==========  END  RESPONSE ==========\n",
);

/// Template text for one level.
#[derive(Debug, Clone, Copy)]
pub struct TemplateDef {
    pub level: DetailLevel,
    pub request: &'static str,
    pub response: &'static str,
}

/// The built-in table. `debug` shares the verbose request template.
pub const BUILTIN_TEMPLATES: [TemplateDef; 4] = [
    TemplateDef {
        level: DetailLevel::Minimal,
        request: MINIMAL_REQUEST,
        response: MINIMAL_RESPONSE,
    },
    TemplateDef {
        level: DetailLevel::Normal,
        request: NORMAL_REQUEST,
        response: NORMAL_RESPONSE,
    },
    TemplateDef {
        level: DetailLevel::Verbose,
        request: VERBOSE_REQUEST,
        response: VERBOSE_RESPONSE,
    },
    TemplateDef {
        level: DetailLevel::Debug,
        request: VERBOSE_REQUEST,
        response: DEBUG_RESPONSE,
    },
];

/// Compiled templates for every level except `none`.
pub struct TemplateSet {
    levels: HashMap<DetailLevel, Tera>,
}

impl std::fmt::Debug for TemplateSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut levels: Vec<_> = self.levels.keys().map(|l| l.as_str()).collect();
        levels.sort_unstable();
        f.debug_struct("TemplateSet").field("levels", &levels).finish()
    }
}

impl TemplateSet {
    /// Compile the built-in table.
    pub fn new() -> LoggerResult<Self> {
        Self::compile(&BUILTIN_TEMPLATES)
    }

    /// Compile `defs`; every level except `none` must be covered.
    pub fn compile(defs: &[TemplateDef]) -> LoggerResult<Self> {
        let mut levels = HashMap::new();

        for def in defs.iter().filter(|def| def.level.is_enabled()) {
            let mut tera = Tera::default();
            tera.autoescape_on(vec![]);
            register_filters(&mut tera);
            tera.add_raw_templates(vec![(REQUEST, def.request), (RESPONSE, def.response)])
                .map_err(|source| LoggerError::Template { level: def.level, source })?;
            levels.insert(def.level, tera);
        }

        for level in DetailLevel::ALL.into_iter().filter(|l| l.is_enabled()) {
            let def = defs.iter().find(|def| def.level == level);
            match def {
                Some(def) if def.request.is_empty() => {
                    return Err(LoggerError::MissingTemplate { level, direction: REQUEST })
                }
                Some(def) if def.response.is_empty() => {
                    return Err(LoggerError::MissingTemplate { level, direction: RESPONSE })
                }
                Some(_) => {}
                None => return Err(LoggerError::MissingTemplate { level, direction: REQUEST }),
            }
        }

        Ok(Self { levels })
    }

    /// Render the request template for `level`; `Ok(None)` at `none`.
    pub fn render_request(
        &self,
        level: DetailLevel,
        request: &RequestContext,
    ) -> LoggerResult<Option<String>> {
        let mut context = Context::new();
        context.insert(REQUEST, request);
        if let Some(id) = &request.request_id {
            context.insert("request_id", id);
        }
        self.render(level, REQUEST, &context)
    }

    /// Render the response template for `level`; `Ok(None)` at `none`.
    pub fn render_response(
        &self,
        level: DetailLevel,
        response: &ResponseContext,
    ) -> LoggerResult<Option<String>> {
        let mut context = Context::new();
        context.insert(RESPONSE, response);
        if let Some(id) = &response.request_id {
            context.insert("request_id", id);
        }
        self.render(level, RESPONSE, &context)
    }

    fn render(
        &self,
        level: DetailLevel,
        direction: &'static str,
        context: &Context,
    ) -> LoggerResult<Option<String>> {
        if !level.is_enabled() {
            return Ok(None);
        }
        let tera = self
            .levels
            .get(&level)
            .ok_or(LoggerError::MissingTemplate { level, direction })?;
        tera.render(direction, context)
            .map(Some)
            .map_err(|source| LoggerError::Render { level, direction, source })
    }
}
