//! Opções por requisição: parse do argv e merge por precedência.
//!
//! Cada requisição carrega um vetor plano de argumentos no estilo da CLI
//! da ferramenta. O parse normaliza as flags com hífen para os nomes
//! canônicos em camelCase e materializa todas as opções reconhecidas com
//! seus defaults fixos. O resultado vive só durante a requisição.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde_json::Value;

use crate::engine::OptionMap;
use crate::types::errors::FmtdError;
use crate::FmtdResult;

/// Modo de precedência: opções por chamada vencem a configuração cacheada.
pub const CLI_OVERRIDE: &str = "cli-override";

/// Modo de precedência: a configuração cacheada vence as opções por chamada.
pub const FILE_OVERRIDE: &str = "file-override";

/// Argv cru de uma requisição, no vocabulário da ferramenta.
#[derive(Parser, Debug)]
#[command(name = "fmtd-request", no_binary_name = true, disable_help_flag = true)]
struct RawArgs {
    #[arg(long, default_value_t = 80)]
    print_width: u32,

    #[arg(long, default_value_t = 2)]
    tab_width: u32,

    #[arg(long)]
    use_tabs: bool,

    #[arg(long, overrides_with = "no_semi")]
    semi: bool,

    #[arg(long)]
    no_semi: bool,

    #[arg(long)]
    single_quote: bool,

    #[arg(long, default_value = "as-needed")]
    quote_props: String,

    #[arg(long, default_value = "all")]
    trailing_comma: String,

    #[arg(long, overrides_with = "no_bracket_spacing")]
    bracket_spacing: bool,

    #[arg(long)]
    no_bracket_spacing: bool,

    #[arg(long, default_value = "always")]
    arrow_parens: String,

    #[arg(long, default_value_t = 0)]
    range_start: u32,

    #[arg(long, default_value_t = u32::MAX)]
    range_end: u32,

    #[arg(long)]
    require_pragma: bool,

    #[arg(long)]
    insert_pragma: bool,

    #[arg(long, default_value = "preserve")]
    prose_wrap: String,

    #[arg(long, default_value = "css")]
    html_whitespace_sensitivity: String,

    #[arg(long, default_value = "lf")]
    end_of_line: String,

    #[arg(long, default_value = FILE_OVERRIDE)]
    config_precedence: String,

    #[arg(long, overrides_with = "no_editorconfig")]
    editorconfig: bool,

    #[arg(long)]
    no_editorconfig: bool,

    #[arg(long)]
    no_config: bool,

    #[arg(long)]
    parser: Option<String>,

    #[arg(long)]
    stdin: bool,

    #[arg(long)]
    stdin_filepath: Option<PathBuf>,

    #[arg(long = "plugin-search-dir")]
    plugin_search_dirs: Vec<String>,

    #[arg(long = "plugin")]
    plugins: Vec<String>,

    /// Arquivo alvo posicional, se houver.
    file: Option<PathBuf>,
}

/// Conjunto de opções de uma requisição, já normalizado.
#[derive(Debug, Clone)]
pub struct ParsedRequestOptions {
    /// Mapa canônico nome → valor, com todos os defaults materializados.
    /// Sempre inclui `configPrecedence`; inclui `filepath` quando a
    /// requisição veio de stdin com caminho explícito.
    pub options: OptionMap,

    /// Modo de precedência da configuração.
    pub config_precedence: String,

    /// A requisição traz o texto via stdin.
    pub stdin: bool,

    /// Caminho explícito informado junto com stdin.
    pub stdin_filepath: Option<PathBuf>,

    /// Arquivo alvo posicional.
    pub file: Option<PathBuf>,

    /// Diretórios de busca de plugins.
    pub plugin_search_dirs: Vec<String>,

    /// Plugins pedidos na requisição.
    pub plugins: Vec<String>,
}

impl ParsedRequestOptions {
    /// Parseia um argv plano de requisição.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> FmtdResult<Self> {
        let raw = RawArgs::try_parse_from(args.iter().map(AsRef::as_ref))
            .map_err(|e| FmtdError::invalid_request(e.to_string()))?;

        let mut options = OptionMap::new();
        options.insert("printWidth".into(), Value::from(raw.print_width));
        options.insert("tabWidth".into(), Value::from(raw.tab_width));
        options.insert("useTabs".into(), Value::Bool(raw.use_tabs));
        options.insert("semi".into(), Value::Bool(!raw.no_semi));
        options.insert("singleQuote".into(), Value::Bool(raw.single_quote));
        options.insert("quoteProps".into(), Value::String(raw.quote_props));
        options.insert("trailingComma".into(), Value::String(raw.trailing_comma));
        options.insert(
            "bracketSpacing".into(),
            Value::Bool(!raw.no_bracket_spacing),
        );
        options.insert("arrowParens".into(), Value::String(raw.arrow_parens));
        options.insert("rangeStart".into(), Value::from(raw.range_start));
        options.insert("rangeEnd".into(), Value::from(raw.range_end));
        options.insert("requirePragma".into(), Value::Bool(raw.require_pragma));
        options.insert("insertPragma".into(), Value::Bool(raw.insert_pragma));
        options.insert("proseWrap".into(), Value::String(raw.prose_wrap));
        options.insert(
            "htmlWhitespaceSensitivity".into(),
            Value::String(raw.html_whitespace_sensitivity),
        );
        options.insert("endOfLine".into(), Value::String(raw.end_of_line));
        options.insert(
            "configPrecedence".into(),
            Value::String(raw.config_precedence.clone()),
        );
        options.insert("editorconfig".into(), Value::Bool(!raw.no_editorconfig));
        options.insert("config".into(), Value::Bool(!raw.no_config));

        if let Some(parser) = &raw.parser {
            options.insert("parser".into(), Value::String(parser.clone()));
        }
        if let Some(path) = &raw.stdin_filepath {
            options.insert(
                "filepath".into(),
                Value::String(path.to_string_lossy().into_owned()),
            );
        }
        if !raw.plugins.is_empty() {
            options.insert(
                "plugins".into(),
                Value::Array(raw.plugins.iter().cloned().map(Value::String).collect()),
            );
        }
        if !raw.plugin_search_dirs.is_empty() {
            options.insert(
                "pluginSearchDirs".into(),
                Value::Array(
                    raw.plugin_search_dirs
                        .iter()
                        .cloned()
                        .map(Value::String)
                        .collect(),
                ),
            );
        }

        Ok(Self {
            options,
            config_precedence: raw.config_precedence,
            stdin: raw.stdin,
            stdin_filepath: raw.stdin_filepath,
            file: raw.file,
            plugin_search_dirs: raw.plugin_search_dirs,
            plugins: raw.plugins,
        })
    }

    /// Arquivo alvo da requisição (caminho de stdin ou posicional),
    /// resolvido contra o diretório do projeto.
    pub fn target_path(&self, project_dir: &Path) -> Option<PathBuf> {
        let path = self.stdin_filepath.as_ref().or(self.file.as_ref())?;
        Some(if path.is_absolute() {
            path.clone()
        } else {
            project_dir.join(path)
        })
    }
}

/// Mescla a configuração cacheada do projeto com as opções da requisição,
/// conforme o modo de precedência.
///
/// Um modo desconhecido produz um mapa vazio, preservando o comportamento
/// histórico, mas deixa rastro no log em vez de falhar em silêncio.
pub fn merge_options(precedence: &str, cached: &OptionMap, per_call: &OptionMap) -> OptionMap {
    match precedence {
        CLI_OVERRIDE => overlay(cached, per_call),
        FILE_OVERRIDE => overlay(per_call, cached),
        other => {
            tracing::warn!(
                precedence = %other,
                "Unrecognized config precedence; producing an empty option set"
            );
            OptionMap::new()
        }
    }
}

/// `over` vence `base` em chaves conflitantes.
fn overlay(base: &OptionMap, over: &OptionMap) -> OptionMap {
    let mut merged = base.clone();
    merged.extend(over.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}
