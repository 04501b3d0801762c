//! Best-effort, regex-driven function extraction
//!
//! Each language has one or more header patterns that end on the opening
//! brace of a body. The body extent is then found by counting braces from
//! that point. Strings, comments and character literals are not modeled, so
//! a brace inside a literal can shift the end of a capture and some
//! functions will be missed entirely. Treat the output as approximate.

use super::language::SupportedLanguage;
use crate::error::ExtractionError;
use regex::{Captures, Regex};
use tokio_util::sync::CancellationToken;

/// Names that look like a call or declaration header but open a block
const BLOCK_KEYWORDS: &[&str] = &[
    "if",
    "else",
    "for",
    "foreach",
    "while",
    "do",
    "switch",
    "case",
    "catch",
    "try",
    "finally",
    "return",
    "new",
    "throw",
    "sizeof",
    "typeof",
    "using",
    "lock",
    "fixed",
    "synchronized",
    "with",
    "function",
];

const JS_FUNCTION: &str = r"(?m)^[ \t]*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*(?P<name>[\w$]+)\s*\([^)]*\)\s*\{";
const JS_ARROW: &str = r"(?m)^[ \t]*(?:export\s+)?(?:const|let|var)\s+(?P<name>[\w$]+)\s*=\s*(?:async\s*)?(?:\([^)]*\)|[\w$]+)\s*=>\s*\{";
const JS_METHOD: &str = r"(?m)^[ \t]*(?:(?:static|async|get|set)\s+)*\*?(?P<name>[\w$]+)\s*\([^)]*\)\s*\{";

const TS_FUNCTION: &str = r"(?m)^[ \t]*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*(?P<name>[\w$]+)\s*(?:<[^>]*>)?\s*\([^)]*\)\s*(?::\s*[^{;]+?)?\s*\{";
const TS_ARROW: &str = r"(?m)^[ \t]*(?:export\s+)?(?:const|let|var)\s+(?P<name>[\w$]+)\s*(?::\s*[^=;]+)?=\s*(?:async\s*)?(?:<[^>]*>\s*)?\([^)]*\)\s*(?::\s*[^=;{]+?)?\s*=>\s*\{";
const TS_METHOD: &str = r"(?m)^[ \t]*(?:(?:public|private|protected|static|readonly|abstract|override|async|get|set)\s+)*\*?(?P<name>[\w$]+)\s*(?:<[^>]*>)?\s*\([^)]*\)\s*(?::\s*[^{;]+?)?\s*\{";

const JAVA_METHOD: &str = r"(?m)^[ \t]*(?:@\w+(?:\([^)]*\))?\s+)*(?:(?:public|private|protected|static|final|abstract|synchronized|native|default|strictfp)\s+)*(?:<[^>]+>\s*)?(?:(?P<ret>[\w<>\[\].?]+(?:,\s*[\w<>\[\].?]+)*)\s+)?(?P<name>\w+)\s*\([^)]*\)\s*(?:throws\s+[\w.,\s]+?)?\s*\{";

const C_FUNCTION: &str = r"(?m)^[ \t]*(?:(?:static|inline|extern|const|unsigned|signed|struct|enum|volatile)\s+)*(?P<ret>[\w:]+(?:<[^>]*>)?)[\s*&]+(?P<name>[\w:~]+)\s*\([^)]*\)\s*(?:const\s*)?(?:noexcept\s*)?(?:override\s*)?\{";
const CPP_FUNCTION: &str = r"(?m)^[ \t]*(?:template\s*<[^>]*>\s*)?(?:(?:static|inline|extern|virtual|constexpr|explicit|const|unsigned|signed|struct|enum|volatile)\s+)*(?P<ret>[\w:]+(?:<[^>]*>)?)[\s*&]+(?P<name>[\w:~]+)\s*\([^)]*\)\s*(?:const\s*)?(?:noexcept\s*)?(?:override\s*)?(?:final\s*)?\{";

const CSHARP_METHOD: &str = r"(?m)^[ \t]*(?:\[[^\]]*\]\s*)*(?:(?:public|private|protected|internal|static|virtual|async|override|abstract|sealed|extern|unsafe|new|partial)\s+)*(?:(?P<ret>[\w<>\[\],.?]+)\s+)?(?P<name>\w+)\s*(?:<[^>]+>)?\s*\([^)]*\)\s*(?::\s*(?:base|this)\s*\([^)]*\)\s*)?(?:where\s+[^{]+)?\{";

const GO_FUNCTION: &str = r"(?m)^func\s*(?:\([^)]*\)\s*)?(?P<name>\w+)\s*(?:\[[^\]]*\])?\s*\([^)]*\)\s*[^{\n]*\{";

/// Compiled header patterns for one language
#[derive(Debug, Clone)]
pub struct PatternSet {
    language: SupportedLanguage,
    headers: Vec<Regex>,
}

impl PatternSet {
    /// Compile the header patterns for `language`.
    ///
    /// Returns `Ok(None)` for a language that has no pattern configured.
    pub fn for_language(language: SupportedLanguage) -> Result<Option<Self>, ExtractionError> {
        let sources: &[&str] = match language {
            SupportedLanguage::JavaScript => &[JS_FUNCTION, JS_ARROW, JS_METHOD],
            SupportedLanguage::TypeScript => &[TS_FUNCTION, TS_ARROW, TS_METHOD],
            SupportedLanguage::Java => &[JAVA_METHOD],
            SupportedLanguage::C => &[C_FUNCTION],
            SupportedLanguage::Cpp => &[CPP_FUNCTION],
            SupportedLanguage::CSharp => &[CSHARP_METHOD],
            SupportedLanguage::Go => &[GO_FUNCTION],
            SupportedLanguage::Python => return Ok(None),
        };

        let headers = sources
            .iter()
            .map(|source| {
                Regex::new(source).map_err(|e| ExtractionError::InvalidPattern {
                    language: language.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Self { language, headers }))
    }

    pub fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Find function blocks in `code`, in order of appearance.
    ///
    /// Matches never overlap: after a block is captured the search resumes
    /// past its closing brace, so nested functions stay inside their parent.
    pub fn extract(&self, code: &str) -> Vec<String> {
        self.extract_cancellable(code, &CancellationToken::new())
            .unwrap_or_default()
    }

    /// Like [`extract`](Self::extract), checking `cancel` before each header
    /// search.
    pub fn extract_cancellable(
        &self,
        code: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, ExtractionError> {
        let mut scan = HeaderScan::new(&self.headers, code);
        let mut snippets = Vec::new();
        let mut offset = 0;

        while offset < code.len() {
            if cancel.is_cancelled() {
                return Err(ExtractionError::Cancelled);
            }

            let Some((start, open_brace)) = scan.next_header(offset) else {
                break;
            };

            match find_block_end(code, open_brace) {
                Some(end) => {
                    snippets.push(code[start..end].to_string());
                    offset = end;
                }
                None => {
                    tracing::debug!(
                        "Unbalanced braces after {} header at byte {}, dropping match",
                        self.language,
                        start
                    );
                    offset = open_brace + 1;
                }
            }
        }

        Ok(snippets)
    }
}

/// Last search result of one header regex
enum Pending<'c> {
    Unsearched,
    Found(Captures<'c>),
    Exhausted,
}

/// Header search over one file.
///
/// Offsets only move forward, so a regex's pending match stays valid until
/// the offset passes its start and each regex scans the file about once.
struct HeaderScan<'p, 'c> {
    headers: &'p [Regex],
    code: &'c str,
    pending: Vec<Pending<'c>>,
}

impl<'p, 'c> HeaderScan<'p, 'c> {
    fn new(headers: &'p [Regex], code: &'c str) -> Self {
        Self {
            headers,
            code,
            pending: headers.iter().map(|_| Pending::Unsearched).collect(),
        }
    }

    /// Earliest acceptable header at or after `offset`.
    ///
    /// Returns the byte where the signature text starts (leading
    /// indentation trimmed) and the byte of its opening brace.
    fn next_header(&mut self, offset: usize) -> Option<(usize, usize)> {
        let mut search_from = offset;

        loop {
            let best = self.earliest(search_from)?;
            let whole = best.get(0)?;
            let rejected = best
                .name("name")
                .is_some_and(|m| BLOCK_KEYWORDS.contains(&m.as_str()))
                || best
                    .name("ret")
                    .is_some_and(|m| BLOCK_KEYWORDS.contains(&m.as_str()));

            if !rejected {
                let text = whole.as_str();
                let leading = text.len() - text.trim_start().len();
                return Some((whole.start() + leading, whole.end() - 1));
            }

            // Retry past the rejected header's first line
            search_from = match self.code[whole.start()..].find('\n') {
                Some(pos) if whole.start() + pos + 1 > search_from => whole.start() + pos + 1,
                _ => whole.end(),
            };
            if search_from >= self.code.len() {
                return None;
            }
        }
    }

    /// Earliest match of any header starting at or after `from`; ties go to
    /// the pattern listed first.
    fn earliest(&mut self, from: usize) -> Option<Captures<'c>> {
        let headers = self.headers;
        let mut best: Option<(usize, usize)> = None;

        for (index, header) in headers.iter().enumerate() {
            let stale = match &self.pending[index] {
                Pending::Unsearched => true,
                Pending::Found(caps) => caps.get(0).is_none_or(|m| m.start() < from),
                Pending::Exhausted => false,
            };
            if stale {
                self.pending[index] = match header.captures_at(self.code, from) {
                    Some(caps) => Pending::Found(caps),
                    None => Pending::Exhausted,
                };
            }

            if let Pending::Found(caps) = &self.pending[index]
                && let Some(m) = caps.get(0)
                && best.is_none_or(|(start, _)| m.start() < start)
            {
                best = Some((m.start(), index));
            }
        }

        let (_, index) = best?;
        match std::mem::replace(&mut self.pending[index], Pending::Unsearched) {
            Pending::Found(caps) => Some(caps),
            _ => None,
        }
    }
}

/// Byte index one past the brace closing the block opened at `open_brace`.
fn find_block_end(code: &str, open_brace: usize) -> Option<usize> {
    let mut depth = 0usize;

    for (index, byte) in code.as_bytes()[open_brace..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(open_brace + index + 1);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(language: SupportedLanguage, code: &str) -> Vec<String> {
        PatternSet::for_language(language)
            .unwrap()
            .expect("language has patterns")
            .extract(code)
    }

    #[test]
    fn test_every_pattern_compiles() {
        for language in SupportedLanguage::ALL {
            let set = PatternSet::for_language(language).unwrap();
            assert_eq!(set.is_none(), language == SupportedLanguage::Python);
        }
    }

    #[test]
    fn test_go_single_line_function() {
        let snippets = extract(SupportedLanguage::Go, "func Foo() { return 1 }");
        assert_eq!(snippets, vec!["func Foo() { return 1 }".to_string()]);
    }

    #[test]
    fn test_go_method_and_return_types() {
        let code = r#"package server

func (s *Server) Start(addr string) (int, error) {
	if addr == "" {
		return 0, errEmpty
	}
	return 1, nil
}

func helper[T any](v T) T {
	return v
}
"#;
        let snippets = extract(SupportedLanguage::Go, code);
        assert_eq!(snippets.len(), 2);
        assert!(snippets[0].starts_with("func (s *Server) Start"));
        assert!(snippets[0].ends_with("return 1, nil\n}"));
        assert!(snippets[1].starts_with("func helper[T any]"));
    }

    #[test]
    fn test_javascript_forms() {
        let code = r#"
function add(a, b) {
  return a + b;
}

export const mul = (a, b) => {
  return a * b;
};

async function load(url) {
  if (url) {
    return fetch(url);
  }
}
"#;
        let snippets = extract(SupportedLanguage::JavaScript, code);
        assert_eq!(snippets.len(), 3);
        assert!(snippets[0].starts_with("function add(a, b) {"));
        assert!(snippets[1].starts_with("export const mul"));
        assert!(snippets[2].starts_with("async function load"));
        assert!(snippets[2].contains("return fetch(url);"));
    }

    #[test]
    fn test_javascript_control_flow_is_not_a_function() {
        let code = "if (ready) {\n  start();\n}\nwhile (x) {\n  x--;\n}\n";
        assert!(extract(SupportedLanguage::JavaScript, code).is_empty());
    }

    #[test]
    fn test_javascript_class_methods() {
        let code = r#"
class Counter {
  constructor() {
    this.n = 0;
  }

  increment() {
    this.n += 1;
  }
}
"#;
        let snippets = extract(SupportedLanguage::JavaScript, code);
        assert_eq!(snippets.len(), 2);
        assert!(snippets[0].starts_with("constructor() {"));
        assert!(snippets[1].starts_with("increment() {"));
    }

    #[test]
    fn test_typescript_annotations() {
        let code = r#"
export function parse(input: string): number {
  return Number(input);
}

const handler = async (req: Request): Promise<void> => {
  await req.json();
};
"#;
        let snippets = extract(SupportedLanguage::TypeScript, code);
        assert_eq!(snippets.len(), 2);
        assert!(snippets[0].starts_with("export function parse"));
        assert!(snippets[1].starts_with("const handler"));
    }

    #[test]
    fn test_java_methods_inside_class() {
        let code = r#"
public class Greeter {
    private final String prefix;

    public Greeter(String prefix) {
        this.prefix = prefix;
    }

    public String greet(String name) throws IllegalStateException {
        if (name == null) {
            throw new IllegalStateException();
        }
        return prefix + name;
    }
}
"#;
        let snippets = extract(SupportedLanguage::Java, code);
        assert_eq!(snippets.len(), 2);
        assert!(snippets[0].starts_with("public Greeter(String prefix)"));
        assert!(snippets[1].starts_with("public String greet"));
        assert!(snippets[1].trim_end().ends_with('}'));
    }

    #[test]
    fn test_java_anonymous_class_rejected() {
        let code = "    Runnable r = new Runnable() {\n    };\n";
        assert!(extract(SupportedLanguage::Java, code).is_empty());
    }

    #[test]
    fn test_c_functions() {
        let code = r#"
#include <stdio.h>

static int add(int a, int b) {
    return a + b;
}

int
main(void)
{
    printf("%d\n", add(1, 2));
    return 0;
}
"#;
        let snippets = extract(SupportedLanguage::C, code);
        assert_eq!(snippets.len(), 2);
        assert!(snippets[0].starts_with("static int add"));
        assert!(snippets[1].starts_with("int\nmain(void)"));
    }

    #[test]
    fn test_cpp_qualified_and_else_if() {
        let code = r#"
std::string Widget::name() const {
    if (id_ > 0) {
        return "w";
    } else if (id_ < 0) {
        return "neg";
    }
    return "";
}
"#;
        let snippets = extract(SupportedLanguage::Cpp, code);
        assert_eq!(snippets.len(), 1);
        assert!(snippets[0].starts_with("std::string Widget::name() const {"));
    }

    #[test]
    fn test_csharp_methods() {
        let code = r#"
namespace App
{
    public class Service
    {
        public async Task<int> RunAsync(string name)
        {
            return await Task.FromResult(name.Length);
        }

        private static bool IsValid(int? value) { return value.HasValue; }
    }
}
"#;
        let snippets = extract(SupportedLanguage::CSharp, code);
        assert_eq!(snippets.len(), 2);
        assert!(snippets[0].starts_with("public async Task<int> RunAsync"));
        assert!(snippets[1].starts_with("private static bool IsValid"));
    }

    #[test]
    fn test_unbalanced_body_is_dropped() {
        let snippets = extract(SupportedLanguage::Go, "func Broken() {\n\tif x {\n");
        assert!(snippets.is_empty());
    }

    #[test]
    fn test_cancelled_scan_stops() {
        let patterns = PatternSet::for_language(SupportedLanguage::Go)
            .unwrap()
            .unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = patterns.extract_cancellable("func Foo() { return 1 }\n", &cancel);
        assert!(matches!(result, Err(ExtractionError::Cancelled)));
    }

    #[test]
    fn test_interleaved_patterns_keep_source_order() {
        let code = "const a = () => {\n  return 1;\n};\n\nfunction b() {\n  return 2;\n}\n\nconst c = (x) => {\n  return x;\n};\n\nfunction d() {\n  return 4;\n}\n";
        let snippets = extract(SupportedLanguage::JavaScript, code);
        let heads: Vec<&str> = snippets
            .iter()
            .map(|s| s.lines().next().unwrap_or(""))
            .collect();
        assert_eq!(
            heads,
            vec![
                "const a = () => {",
                "function b() {",
                "const c = (x) => {",
                "function d() {"
            ]
        );
    }

    #[test]
    fn test_block_end_counts_nesting() {
        let code = "{ a { b } c }";
        assert_eq!(find_block_end(code, 0), Some(code.len()));
        assert_eq!(find_block_end("{ {", 0), None);
    }
}
