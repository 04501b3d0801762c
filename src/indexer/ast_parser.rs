use super::language::SupportedLanguage;
use crate::error::ExtractionError;
use rustpython_parser::Mode;
use tokio_util::sync::CancellationToken;
use tree_sitter::{Language, Node, ParseOptions, ParseState, Parser};

/// Tree-sitter grammar plus the node kinds that count as a function in it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuralGrammar {
    language: SupportedLanguage,
}

impl StructuralGrammar {
    /// Grammar for a supported language. Every supported language ships one.
    pub fn for_language(language: SupportedLanguage) -> Self {
        Self { language }
    }

    pub fn language(&self) -> SupportedLanguage {
        self.language
    }

    fn ts_language(&self) -> Language {
        match self.language {
            SupportedLanguage::Python => tree_sitter_python::LANGUAGE.into(),
            SupportedLanguage::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            SupportedLanguage::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            SupportedLanguage::Go => tree_sitter_go::LANGUAGE.into(),
            SupportedLanguage::Java => tree_sitter_java::LANGUAGE.into(),
            SupportedLanguage::C => tree_sitter_c::LANGUAGE.into(),
            SupportedLanguage::Cpp => tree_sitter_cpp::LANGUAGE.into(),
            SupportedLanguage::CSharp => tree_sitter_c_sharp::LANGUAGE.into(),
        }
    }

    fn function_kinds(&self) -> &'static [&'static str] {
        match self.language {
            SupportedLanguage::Python => &["function_definition"],
            SupportedLanguage::JavaScript | SupportedLanguage::TypeScript => &[
                "function_declaration",
                "generator_function_declaration",
                "method_definition",
            ],
            SupportedLanguage::Go => &["function_declaration", "method_declaration"],
            SupportedLanguage::Java => &["method_declaration", "constructor_declaration"],
            SupportedLanguage::C | SupportedLanguage::Cpp => &["function_definition"],
            SupportedLanguage::CSharp => &[
                "method_declaration",
                "constructor_declaration",
                "local_function_statement",
            ],
        }
    }
}

/// Parser that returns the exact source text of every function definition
pub struct AstParser {
    parser: Parser,
    grammar: StructuralGrammar,
}

impl AstParser {
    pub fn new(grammar: StructuralGrammar) -> Result<Self, ExtractionError> {
        let mut parser = Parser::new();
        parser
            .set_language(&grammar.ts_language())
            .map_err(|e| ExtractionError::GrammarFailed {
                language: grammar.language().to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self { parser, grammar })
    }

    /// Parse `source_code` and return function texts in source order.
    ///
    /// Any syntax error rejects the whole file; `origin` is only used for the
    /// error message.
    pub fn extract_functions(
        &mut self,
        source_code: &str,
        origin: &str,
    ) -> Result<Vec<String>, ExtractionError> {
        self.extract_functions_cancellable(source_code, origin, &CancellationToken::new())
    }

    /// Like [`extract_functions`](Self::extract_functions), but parsing stops
    /// as soon as `cancel` fires.
    pub fn extract_functions_cancellable(
        &mut self,
        source_code: &str,
        origin: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, ExtractionError> {
        // tree-sitter recovers from errors a Python 3 compiler rejects
        // (py2 `print x`, unexpected indents), so Python gets a strict check
        if self.grammar.language() == SupportedLanguage::Python {
            check_python_syntax(source_code, origin)?;
        }
        if cancel.is_cancelled() {
            return Err(ExtractionError::Cancelled);
        }

        let bytes = source_code.as_bytes();
        let mut stop = |_: &ParseState| cancel.is_cancelled();
        let tree = self.parser.parse_with_options(
            &mut move |offset, _| bytes.get(offset..).unwrap_or_default(),
            None,
            Some(ParseOptions::new().progress_callback(&mut stop)),
        );
        let Some(tree) = tree else {
            if cancel.is_cancelled() {
                return Err(ExtractionError::Cancelled);
            }
            return Err(ExtractionError::ParseFailed(origin.to_string()));
        };

        let root_node = tree.root_node();
        if root_node.has_error() {
            return Err(ExtractionError::SyntaxError(origin.to_string()));
        }

        let mut functions = Vec::new();
        self.collect_functions(root_node, bytes, &mut functions);
        Ok(functions)
    }

    /// Pre-order walk so nested functions follow their parent
    fn collect_functions(&self, node: Node, source: &[u8], result: &mut Vec<String>) {
        if self.grammar.function_kinds().contains(&node.kind()) {
            // A span that does not decode is dropped on its own
            if let Ok(text) = node.utf8_text(source) {
                result.push(text.to_string());
            }
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.collect_functions(child, source, result);
        }
    }

    pub fn language(&self) -> SupportedLanguage {
        self.grammar.language()
    }
}

/// Full Python 3 parse, used only as a validity gate
fn check_python_syntax(source: &str, origin: &str) -> Result<(), ExtractionError> {
    rustpython_parser::parse(source, Mode::Module, origin)
        .map(|_| ())
        .map_err(|e| {
            tracing::debug!("Python syntax error in {}: {}", origin, e);
            ExtractionError::SyntaxError(origin.to_string())
        })
}
