use std::error::Error as _;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tera::{Context, Tera};
use tracing::{debug, instrument};
use walkdir::WalkDir;

use stencil_core::{
    application::{ApplicationError, ports::TemplateRenderer},
    error::StencilResult,
};

use super::filters;

/// Suffix stripped from template file names in a template directory.
const TEMPLATE_SUFFIX: &str = ".tera";

/// Templates compiled into the binary, by the name artifacts ask for.
pub const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("CMakeLists.txt", include_str!("../../templates/CMakeLists.txt.tera")),
    ("bindings.hpp", include_str!("../../templates/bindings.hpp.tera")),
    ("bindings.cpp", include_str!("../../templates/bindings.cpp.tera")),
    ("module.hpp", include_str!("../../templates/module.hpp.tera")),
    ("module.cpp", include_str!("../../templates/module.cpp.tera")),
    ("interface-impl.hpp", include_str!("../../templates/interface-impl.hpp.tera")),
    ("interface-impl.cpp", include_str!("../../templates/interface-impl.cpp.tera")),
    ("interface-base.hpp", include_str!("../../templates/interface-base.hpp.tera")),
    ("interface-exports.hpp", include_str!("../../templates/interface-exports.hpp.tera")),
    ("types.hpp", include_str!("../../templates/types.hpp.tera")),
];

/// [`TemplateRenderer`] over a Tera instance.
///
/// Auto-escaping is off: every template produces source code.
pub struct TeraRenderer {
    tera: Tera,
}

impl TeraRenderer {
    /// Renderer with the built-in templates only.
    pub fn new() -> StencilResult<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        filters::register(&mut tera);
        tera.add_raw_templates(BUILTIN_TEMPLATES.iter().copied())
            .map_err(|e| failed("<builtin>", &e))?;
        Ok(Self { tera })
    }

    /// Built-in templates, overridden by the files under `dir`.
    ///
    /// A file is registered under its path relative to `dir`, with `/`
    /// separators and any `.tera` suffix removed, so `dir/types.hpp.tera`
    /// replaces the built-in `types.hpp`.
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub fn with_template_dir(dir: &Path) -> StencilResult<Self> {
        let mut renderer = Self::new()?;
        let mut overrides: Vec<(PathBuf, Option<String>)> = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| ApplicationError::FilesystemError {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = template_name(dir, entry.path())?;
            debug!(template = %name, path = %entry.path().display(), "Template override");
            overrides.push((entry.path().to_path_buf(), Some(name)));
        }

        renderer
            .tera
            .add_template_files(overrides)
            .map_err(|e| failed(&dir.display().to_string(), &e))?;
        Ok(renderer)
    }

    /// Names of every registered template, sorted.
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tera.get_template_names().collect();
        names.sort_unstable();
        names
    }
}

impl TemplateRenderer for TeraRenderer {
    fn render(&self, template: &str, data: &Value) -> StencilResult<String> {
        if !self.has_template(template) {
            return Err(ApplicationError::RenderingFailed {
                template: template.to_string(),
                reason: "no such template".into(),
            }
            .into());
        }
        let context = Context::from_value(data.clone()).map_err(|e| failed(template, &e))?;
        self.tera
            .render(template, &context)
            .map_err(|e| failed(template, &e).into())
    }

    fn has_template(&self, template: &str) -> bool {
        self.tera.get_template_names().any(|name| name == template)
    }
}

fn template_name(dir: &Path, path: &Path) -> StencilResult<String> {
    let relative = path
        .strip_prefix(dir)
        .map_err(|_| ApplicationError::FilesystemError {
            path: path.to_path_buf(),
            reason: format!("not below the template directory {}", dir.display()),
        })?;
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    Ok(joined
        .strip_suffix(TEMPLATE_SUFFIX)
        .map_or_else(|| joined.clone(), str::to_string))
}

/// Tera hides the useful part of an error in its source chain.
fn failed(template: &str, err: &tera::Error) -> ApplicationError {
    let mut reason = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        reason.push_str(": ");
        reason.push_str(&cause.to_string());
        source = cause.source();
    }
    ApplicationError::RenderingFailed {
        template: template.to_string(),
        reason,
    }
}
