//! Engine concreto sobre uma CLI de formatação externa.
//!
//! Encapsula uma ferramenta externa (por padrão `prettier`) atrás da
//! trait [`FormatEngine`]: descoberta do arquivo de configuração mais
//! próximo, parse da configuração (JSON e chave em `package.json`),
//! integração mínima com `.editorconfig`, matching de ignore-file e
//! formatação via subprocess com o texto em stdin.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use ignore::gitignore::GitignoreBuilder;
use serde_json::Value;

use super::{
    EngineLoader, EngineModule, FileInfo, FileInfoRequest, FormatEngine, ModuleRegistry,
    OptionMap, ResolveOptions,
};
use crate::types::errors::FmtdError;
use crate::FmtdResult;

/// Resolve o binário do engine por projeto, com fallback global.
///
/// A resolução local procura `<dir>/node_modules/.bin/<tool>`. O fallback
/// global é o nome do comando puro, resolvido via PATH no momento do
/// spawn - por isso nunca falha na resolução: uma ferramenta realmente
/// ausente só aparece como erro quando uma operação do engine executa.
#[derive(Debug, Clone)]
pub struct CommandLoader {
    command: String,
    extra_args: Vec<String>,
}

impl CommandLoader {
    /// Cria um loader para o comando informado.
    pub fn new(command: impl Into<String>, extra_args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            extra_args,
        }
    }
}

impl EngineLoader for CommandLoader {
    fn resolve(&self, project_dir: &Path) -> Option<EngineModule> {
        let local = project_dir
            .join("node_modules")
            .join(".bin")
            .join(&self.command);

        if local.is_file() {
            Some(EngineModule::local(local, &self.command))
        } else {
            None
        }
    }

    fn resolve_global(&self) -> EngineModule {
        EngineModule::global(&self.command)
    }

    fn load(
        &self,
        module: &EngineModule,
        registry: &ModuleRegistry,
    ) -> FmtdResult<Arc<dyn FormatEngine>> {
        let program = match &module.path {
            Some(path) => {
                registry.record(path.clone());
                path.clone()
            }
            None => PathBuf::from(&module.tool),
        };

        tracing::debug!(
            tool = %module.tool,
            program = %program.display(),
            local = module.path.is_some(),
            "Engine module loaded"
        );

        Ok(Arc::new(CommandEngine::new(
            program,
            self.extra_args.clone(),
            module.tool.clone(),
        )))
    }
}

/// Engine de formatação executado como subprocess.
#[derive(Debug)]
pub struct CommandEngine {
    program: PathBuf,
    base_args: Vec<String>,
    tool: String,
}

impl CommandEngine {
    /// Cria um engine sobre o binário resolvido.
    pub fn new(program: PathBuf, base_args: Vec<String>, tool: impl Into<String>) -> Self {
        Self {
            program,
            base_args,
            tool: tool.into(),
        }
    }

    /// Candidatos a arquivo de configuração, na ordem de precedência.
    fn config_candidates(&self, dir: &Path) -> Vec<PathBuf> {
        vec![
            dir.join(format!(".{}rc", self.tool)),
            dir.join(format!(".{}rc.json", self.tool)),
            dir.join(format!("{}.config.json", self.tool)),
        ]
    }

    /// Procura o arquivo de configuração em `dir` e seus ancestrais.
    fn find_config_file(&self, dir: &Path) -> Option<PathBuf> {
        for ancestor in dir.ancestors() {
            for candidate in self.config_candidates(ancestor) {
                if candidate.is_file() {
                    return Some(candidate);
                }
            }

            // package.json só conta se tiver a chave da ferramenta
            let package = ancestor.join("package.json");
            if package.is_file() && self.package_config(&package).ok().flatten().is_some() {
                return Some(package);
            }
        }
        None
    }

    /// Extrai a chave da ferramenta de um `package.json`, se presente.
    fn package_config(&self, path: &Path) -> FmtdResult<Option<OptionMap>> {
        let content = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)?;
        Ok(value
            .get(&self.tool)
            .and_then(Value::as_object)
            .cloned())
    }

    /// Lê e parseia um arquivo de configuração já localizado.
    fn parse_config_file(&self, path: &Path) -> FmtdResult<OptionMap> {
        if path.file_name().is_some_and(|n| n == "package.json") {
            return Ok(self.package_config(path)?.unwrap_or_default());
        }

        let content = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)?;
        match value {
            Value::Object(map) => Ok(map),
            _ => Err(FmtdError::config(format!(
                "configuração em {} não é um objeto",
                path.display()
            ))),
        }
    }
}

impl FormatEngine for CommandEngine {
    fn resolve_config_file(&self, dir: &Path) -> FmtdResult<Option<PathBuf>> {
        Ok(self.find_config_file(dir))
    }

    fn resolve_config(&self, dir: &Path, opts: &ResolveOptions) -> FmtdResult<Option<OptionMap>> {
        // Este engine sempre relê do disco; `use_cache` existe pela
        // interface e não tem efeito aqui.
        let config = match self.find_config_file(dir) {
            Some(path) => Some(self.parse_config_file(&path)?),
            None => None,
        };

        let editorconfig = if opts.editorconfig {
            parse_editorconfig(&dir.join(".editorconfig"))?
        } else {
            None
        };

        // Arquivo de configuração vence o .editorconfig em chaves conflitantes
        Ok(match (editorconfig, config) {
            (Some(mut base), Some(over)) => {
                base.extend(over);
                Some(base)
            }
            (Some(base), None) => Some(base),
            (None, config) => config,
        })
    }

    fn file_info(&self, path: &Path, req: &FileInfoRequest) -> FmtdResult<FileInfo> {
        let ignored = if req.ignore_path.is_file() {
            let root = req
                .ignore_path
                .parent()
                .unwrap_or_else(|| Path::new("/"))
                .to_path_buf();

            let mut builder = GitignoreBuilder::new(&root);
            if let Some(err) = builder.add(&req.ignore_path) {
                return Err(FmtdError::EngineFailed(self.tool.clone(), err.to_string()));
            }
            let matcher = builder
                .build()
                .map_err(|e| FmtdError::EngineFailed(self.tool.clone(), e.to_string()))?;

            let relative = path.strip_prefix(&root).unwrap_or(path);
            matcher
                .matched_path_or_any_parents(relative, false)
                .is_ignore()
        } else {
            false
        };

        Ok(FileInfo {
            ignored,
            inferred_parser: infer_parser(path),
        })
    }

    fn format(&self, text: &str, options: &OptionMap) -> FmtdResult<String> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.base_args)
            .args(engine_args(options))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command
            .spawn()
            .map_err(|e| FmtdError::EngineLoad(self.tool.clone(), e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(FmtdError::EngineFailed(
                self.tool.clone(),
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Opções numéricas e as flags correspondentes.
const NUMBER_FLAGS: &[(&str, &str)] = &[
    ("printWidth", "--print-width"),
    ("tabWidth", "--tab-width"),
    ("rangeStart", "--range-start"),
    ("rangeEnd", "--range-end"),
];

/// Opções string e as flags correspondentes.
const STRING_FLAGS: &[(&str, &str)] = &[
    ("quoteProps", "--quote-props"),
    ("trailingComma", "--trailing-comma"),
    ("arrowParens", "--arrow-parens"),
    ("proseWrap", "--prose-wrap"),
    ("htmlWhitespaceSensitivity", "--html-whitespace-sensitivity"),
    ("endOfLine", "--end-of-line"),
    ("parser", "--parser"),
    ("filepath", "--stdin-filepath"),
];

/// Booleanas cujo default da ferramenta é falso: emitem a flag quando true.
const TRUE_FLAGS: &[(&str, &str)] = &[
    ("useTabs", "--use-tabs"),
    ("singleQuote", "--single-quote"),
    ("requirePragma", "--require-pragma"),
    ("insertPragma", "--insert-pragma"),
];

/// Booleanas cujo default da ferramenta é verdadeiro: emitem --no-X quando false.
const FALSE_FLAGS: &[(&str, &str)] = &[
    ("semi", "--no-semi"),
    ("bracketSpacing", "--no-bracket-spacing"),
    ("editorconfig", "--no-editorconfig"),
    ("config", "--no-config"),
];

/// Sintetiza a linha de comando da ferramenta a partir do mapa mesclado.
///
/// Chaves sem flag correspondente (`configPrecedence`, `stdin`) são
/// descartadas aqui: pertencem ao pipeline, não à ferramenta.
fn engine_args(options: &OptionMap) -> Vec<String> {
    let mut args = Vec::new();

    for (key, flag) in NUMBER_FLAGS {
        if let Some(n) = options.get(*key).and_then(Value::as_u64) {
            // rangeEnd no máximo representável significa "até o fim"
            if *key == "rangeEnd" && n == u64::from(u32::MAX) {
                continue;
            }
            args.push((*flag).to_string());
            args.push(n.to_string());
        }
    }

    for (key, flag) in STRING_FLAGS {
        if let Some(s) = options.get(*key).and_then(Value::as_str) {
            args.push((*flag).to_string());
            args.push(s.to_string());
        }
    }

    for (key, flag) in TRUE_FLAGS {
        if options.get(*key).and_then(Value::as_bool) == Some(true) {
            args.push((*flag).to_string());
        }
    }

    for (key, flag) in FALSE_FLAGS {
        if options.get(*key).and_then(Value::as_bool) == Some(false) {
            args.push((*flag).to_string());
        }
    }

    if let Some(plugins) = options.get("plugins").and_then(Value::as_array) {
        for plugin in plugins.iter().filter_map(Value::as_str) {
            args.push("--plugin".to_string());
            args.push(plugin.to_string());
        }
    }

    if let Some(dirs) = options.get("pluginSearchDirs").and_then(Value::as_array) {
        for dir in dirs.iter().filter_map(Value::as_str) {
            args.push("--plugin-search-dir".to_string());
            args.push(dir.to_string());
        }
    }

    args
}

/// Parser inferido pela extensão do arquivo.
fn infer_parser(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    let parser = match ext {
        "js" | "jsx" | "mjs" | "cjs" => "babel",
        "ts" | "tsx" | "mts" | "cts" => "typescript",
        "json" => "json",
        "css" => "css",
        "scss" => "scss",
        "less" => "less",
        "md" | "markdown" => "markdown",
        "html" | "htm" => "html",
        "yaml" | "yml" => "yaml",
        "graphql" | "gql" => "graphql",
        "vue" => "vue",
        _ => return None,
    };
    Some(parser.to_string())
}

/// Parse mínimo de um `.editorconfig`: preâmbulo e seção `[*]`, mapeando
/// as chaves com equivalente direto em opções de formatação.
fn parse_editorconfig(path: &Path) -> FmtdResult<Option<OptionMap>> {
    if !path.is_file() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let mut map = OptionMap::new();
    let mut applies = true;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            applies = section == "*";
            continue;
        }

        if !applies {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());

        match key {
            "indent_style" => {
                map.insert("useTabs".to_string(), Value::Bool(value == "tab"));
            }
            "indent_size" | "tab_width" => {
                if let Ok(n) = value.parse::<u64>() {
                    map.insert("tabWidth".to_string(), Value::from(n));
                }
            }
            "max_line_length" => {
                if let Ok(n) = value.parse::<u64>() {
                    map.insert("printWidth".to_string(), Value::from(n));
                }
            }
            "end_of_line" => {
                if matches!(value, "lf" | "crlf" | "cr") {
                    map.insert("endOfLine".to_string(), Value::String(value.to_string()));
                }
            }
            _ => {}
        }
    }

    Ok(if map.is_empty() { None } else { Some(map) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine() -> CommandEngine {
        CommandEngine::new(PathBuf::from("prettier"), Vec::new(), "prettier")
    }

    fn write(path: &Path, content: &str) {
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_resolve_config_file_rc_json() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join(".prettierrc"), r#"{"semi": false}"#);

        let found = engine().resolve_config_file(dir.path()).unwrap();
        assert_eq!(found, Some(dir.path().join(".prettierrc")));
    }

    #[test]
    fn test_resolve_config_file_walks_ancestors() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("packages").join("app");
        std::fs::create_dir_all(&nested).unwrap();
        write(&dir.path().join("prettier.config.json"), r#"{}"#);

        let found = engine().resolve_config_file(&nested).unwrap();
        assert_eq!(found, Some(dir.path().join("prettier.config.json")));
    }

    #[test]
    fn test_resolve_config_file_absent() {
        let dir = tempfile::tempdir().unwrap();
        // tempdir raiz sem nenhum candidato; ancestrais do sistema também não
        let found = engine().resolve_config_file(dir.path()).unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn test_package_json_requires_tool_key() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("package.json"), r#"{"name": "x"}"#);
        assert_eq!(engine().resolve_config_file(dir.path()).unwrap(), None);

        write(
            &dir.path().join("package.json"),
            r#"{"name": "x", "prettier": {"semi": false}}"#,
        );
        let found = engine().resolve_config_file(dir.path()).unwrap();
        assert_eq!(found, Some(dir.path().join("package.json")));

        let config = engine()
            .resolve_config(
                dir.path(),
                &ResolveOptions {
                    use_cache: false,
                    editorconfig: false,
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(config.get("semi"), Some(&json!(false)));
    }

    #[test]
    fn test_resolve_config_merges_editorconfig() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join(".prettierrc"), r#"{"tabWidth": 4}"#);
        write(
            &dir.path().join(".editorconfig"),
            "root = true\n\n[*]\nindent_style = space\nindent_size = 2\nmax_line_length = 100\n",
        );

        let config = engine()
            .resolve_config(
                dir.path(),
                &ResolveOptions {
                    use_cache: false,
                    editorconfig: true,
                },
            )
            .unwrap()
            .unwrap();

        // O arquivo de configuração vence o .editorconfig
        assert_eq!(config.get("tabWidth"), Some(&json!(4)));
        assert_eq!(config.get("printWidth"), Some(&json!(100)));
        assert_eq!(config.get("useTabs"), Some(&json!(false)));
    }

    #[test]
    fn test_resolve_config_editorconfig_disabled() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join(".prettierrc"), r#"{"tabWidth": 4}"#);
        write(
            &dir.path().join(".editorconfig"),
            "[*]\nmax_line_length = 100\n",
        );

        let config = engine()
            .resolve_config(
                dir.path(),
                &ResolveOptions {
                    use_cache: false,
                    editorconfig: false,
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(config.get("printWidth"), None);
    }

    #[test]
    fn test_editorconfig_ignores_other_sections() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join(".editorconfig"),
            "[*]\nindent_size = 2\n\n[Makefile]\nindent_style = tab\n",
        );

        let map = parse_editorconfig(&dir.path().join(".editorconfig"))
            .unwrap()
            .unwrap();
        assert_eq!(map.get("tabWidth"), Some(&json!(2)));
        assert_eq!(map.get("useTabs"), None);
    }

    #[test]
    fn test_file_info_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let ignore_path = dir.path().join(".prettierignore");
        write(&ignore_path, "dist/\n*.min.js\n");

        let req = FileInfoRequest {
            ignore_path,
            ..Default::default()
        };

        let info = engine()
            .file_info(&dir.path().join("dist").join("bundle.js"), &req)
            .unwrap();
        assert!(info.ignored);

        let info = engine()
            .file_info(&dir.path().join("app.min.js"), &req)
            .unwrap();
        assert!(info.ignored);

        let info = engine().file_info(&dir.path().join("app.js"), &req).unwrap();
        assert!(!info.ignored);
    }

    #[test]
    fn test_file_info_missing_ignore_file() {
        let dir = tempfile::tempdir().unwrap();
        let req = FileInfoRequest {
            ignore_path: dir.path().join(".prettierignore"),
            ..Default::default()
        };

        let info = engine().file_info(&dir.path().join("app.js"), &req).unwrap();
        assert!(!info.ignored);
    }

    #[test]
    fn test_infer_parser() {
        assert_eq!(infer_parser(Path::new("a.ts")).as_deref(), Some("typescript"));
        assert_eq!(infer_parser(Path::new("a.jsx")).as_deref(), Some("babel"));
        assert_eq!(infer_parser(Path::new("a.md")).as_deref(), Some("markdown"));
        assert_eq!(infer_parser(Path::new("a.unknown")), None);
        assert_eq!(infer_parser(Path::new("Makefile")), None);
    }

    #[test]
    fn test_engine_args_synthesis() {
        let options: OptionMap = json!({
            "printWidth": 100,
            "semi": false,
            "singleQuote": true,
            "trailingComma": "es5",
            "filepath": "src/app.ts",
            "rangeEnd": u32::MAX,
            "configPrecedence": "cli-override",
            "stdin": true,
            "plugins": ["@org/plugin-sort"]
        })
        .as_object()
        .cloned()
        .unwrap();

        let args = engine_args(&options);

        assert!(args.windows(2).any(|w| w == ["--print-width", "100"]));
        assert!(args.contains(&"--no-semi".to_string()));
        assert!(args.contains(&"--single-quote".to_string()));
        assert!(args.windows(2).any(|w| w == ["--trailing-comma", "es5"]));
        assert!(args.windows(2).any(|w| w == ["--stdin-filepath", "src/app.ts"]));
        assert!(args.windows(2).any(|w| w == ["--plugin", "@org/plugin-sort"]));
        // rangeEnd "infinito" e chaves sem flag correspondente não aparecem
        assert!(!args.contains(&"--range-end".to_string()));
        assert!(!args.iter().any(|a| a.contains("configPrecedence")));
    }

    #[test]
    fn test_engine_args_defaults_true_omitted() {
        let options: OptionMap = json!({"semi": true, "bracketSpacing": true, "useTabs": false})
            .as_object()
            .cloned()
            .unwrap();

        assert!(engine_args(&options).is_empty());
    }

    #[test]
    fn test_loader_resolves_local_bin() {
        let dir = tempfile::tempdir().unwrap();
        let bin_dir = dir.path().join("node_modules").join(".bin");
        std::fs::create_dir_all(&bin_dir).unwrap();
        write(&bin_dir.join("prettier"), "#!/bin/sh\n");

        let loader = CommandLoader::new("prettier", Vec::new());
        let module = loader.resolve(dir.path()).unwrap();
        assert_eq!(module.path, Some(bin_dir.join("prettier")));
        assert_eq!(module.tool, "prettier");
    }

    #[test]
    fn test_loader_global_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let loader = CommandLoader::new("prettier", Vec::new());

        // Sem node_modules local, a resolução falha de forma recuperável
        assert_eq!(loader.resolve(dir.path()), None);

        let module = loader.resolve_global();
        assert_eq!(module.path, None);
        assert_eq!(module.tool, "prettier");
    }

    #[test]
    fn test_load_records_local_module() {
        let dir = tempfile::tempdir().unwrap();
        let bin_dir = dir.path().join("node_modules").join(".bin");
        std::fs::create_dir_all(&bin_dir).unwrap();
        write(&bin_dir.join("prettier"), "#!/bin/sh\n");

        let loader = CommandLoader::new("prettier", Vec::new());
        let registry = ModuleRegistry::new();

        let module = loader.resolve(dir.path()).unwrap();
        loader.load(&module, &registry).unwrap();
        assert!(registry.contains(&bin_dir.join("prettier")));

        // O fallback global não registra nada sob projeto algum
        loader.load(&loader.resolve_global(), &registry).unwrap();
        assert_eq!(registry.len(), 1);
    }
}
