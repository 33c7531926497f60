//! Code block language normalization.

/// Language tag used when nothing better is known.
pub const PLAIN_TEXT: &str = "plain text";

/// Language tags accepted by the code block API.
pub const LANGUAGES: &[&str] = &[
    "abap",
    "arduino",
    "bash",
    "basic",
    "c",
    "clojure",
    "coffeescript",
    "c++",
    "c#",
    "css",
    "dart",
    "diff",
    "docker",
    "elixir",
    "elm",
    "erlang",
    "flow",
    "fortran",
    "f#",
    "gherkin",
    "glsl",
    "go",
    "graphql",
    "groovy",
    "haskell",
    "html",
    "java",
    "javascript",
    "json",
    "julia",
    "kotlin",
    "latex",
    "less",
    "lisp",
    "livescript",
    "lua",
    "makefile",
    "markdown",
    "markup",
    "matlab",
    "mermaid",
    "nix",
    "objective-c",
    "ocaml",
    "pascal",
    "perl",
    "php",
    "plain text",
    "powershell",
    "prolog",
    "protobuf",
    "python",
    "r",
    "reason",
    "ruby",
    "rust",
    "sass",
    "scala",
    "scheme",
    "scss",
    "shell",
    "sql",
    "swift",
    "typescript",
    "vb.net",
    "verilog",
    "vhdl",
    "visual basic",
    "webassembly",
    "xml",
    "yaml",
    "java/c/c++/c#",
];

const ALIASES: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("jsx", "javascript"),
    ("mjs", "javascript"),
    ("node", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("py", "python"),
    ("python3", "python"),
    ("py3", "python"),
    ("sh", "bash"),
    ("zsh", "shell"),
    ("console", "shell"),
    ("shell-session", "shell"),
    ("rb", "ruby"),
    ("rs", "rust"),
    ("cpp", "c++"),
    ("cxx", "c++"),
    ("cc", "c++"),
    ("hpp", "c++"),
    ("h", "c"),
    ("cs", "c#"),
    ("csharp", "c#"),
    ("fs", "f#"),
    ("fsharp", "f#"),
    ("kt", "kotlin"),
    ("kts", "kotlin"),
    ("yml", "yaml"),
    ("md", "markdown"),
    ("dockerfile", "docker"),
    ("golang", "go"),
    ("ps1", "powershell"),
    ("pwsh", "powershell"),
    ("objc", "objective-c"),
    ("objectivec", "objective-c"),
    ("text", PLAIN_TEXT),
    ("txt", PLAIN_TEXT),
    ("plain", PLAIN_TEXT),
    ("plaintext", PLAIN_TEXT),
    ("none", PLAIN_TEXT),
    ("htm", "html"),
    ("xhtml", "html"),
    ("svg", "xml"),
    ("tex", "latex"),
    ("proto", "protobuf"),
    ("make", "makefile"),
    ("mk", "makefile"),
    ("vb", "visual basic"),
    ("vbnet", "vb.net"),
    ("wasm", "webassembly"),
    ("hs", "haskell"),
    ("ex", "elixir"),
    ("exs", "elixir"),
    ("erl", "erlang"),
    ("clj", "clojure"),
    ("coffee", "coffeescript"),
    ("ml", "ocaml"),
    ("pl", "perl"),
    ("gql", "graphql"),
    ("jl", "julia"),
    ("json5", "json"),
    ("jsonc", "json"),
    ("postgresql", "sql"),
    ("mysql", "sql"),
    ("patch", "diff"),
    ("feature", "gherkin"),
];

/// Map a fence info string or class name onto an accepted language tag.
///
/// Unknown input yields [`PLAIN_TEXT`].
pub fn normalize_language(input: &str) -> &'static str {
    let cleaned = input
        .trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .trim_start_matches('.')
        .to_lowercase();

    if cleaned.is_empty() {
        return PLAIN_TEXT;
    }
    if let Some(found) = lookup(&cleaned) {
        return found;
    }

    // Info strings like "python title=x.py"
    match cleaned.split_whitespace().next() {
        Some(first) => lookup(first).unwrap_or(PLAIN_TEXT),
        None => PLAIN_TEXT,
    }
}

fn lookup(name: &str) -> Option<&'static str> {
    LANGUAGES.iter().copied().find(|l| *l == name).or_else(|| {
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, lang)| *lang)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases() {
        assert_eq!(normalize_language("js"), "javascript");
        assert_eq!(normalize_language("py"), "python");
        assert_eq!(normalize_language("sh"), "bash");
        assert_eq!(normalize_language("C++"), "c++");
        assert_eq!(normalize_language("yml"), "yaml");
    }

    #[test]
    fn test_accepted_tags_pass_through() {
        for lang in LANGUAGES {
            assert_eq!(normalize_language(lang), *lang);
        }
    }

    #[test]
    fn test_unknown_defaults_to_plain_text() {
        assert_eq!(normalize_language(""), PLAIN_TEXT);
        assert_eq!(normalize_language("brainfudge"), PLAIN_TEXT);
    }

    #[test]
    fn test_info_string_with_attributes() {
        assert_eq!(normalize_language("rust ignore"), "rust");
        assert_eq!(normalize_language("{.python}"), "python");
    }
}
