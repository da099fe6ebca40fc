use super::{invalid, VariableKind};
use crate::error::{GrammarError, ValueError};
use crate::tokens::unquote;
use crate::value::Value;
use glob::Pattern;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

fn reduce_dir_contents<T>(path: &Path, initial: T, reducer: impl Fn(T, &str) -> T) -> T {
    let dir_contents = match path.read_dir() {
        Ok(dir_contents) => dir_contents,
        Err(_) => return initial,
    };

    let mut value = initial;
    for item in dir_contents {
        let file_name = match item.map(|item| item.file_name()) {
            Ok(item) => item,
            Err(_) => continue,
        };
        if let Some(file_name) = file_name.to_str() {
            value = reducer(value, file_name);
        }
    }
    value
}

fn home_dir() -> Option<String> {
    std::env::var("HOME").ok().filter(|home| !home.is_empty())
}

/// Replaces the leading `~` with the user's home directory.
fn expand_home(text: &str) -> Cow<'_, str> {
    match (text.strip_prefix('~'), home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() || rest.starts_with('/') => {
            Cow::Owned(format!("{}{}", home, rest))
        }
        _ => Cow::Borrowed(text),
    }
}

fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// A filesystem path with completion of directory entries
///
/// The stored value is the unquoted path with a leading `~` expanded. Which paths are accepted
/// can be restricted with include and exclude globs; files whose names start with a dot and
/// directories are rejected unless explicitly allowed. The path is not required to exist.
#[derive(Debug, Clone, Default)]
pub struct File {
    includes: Vec<Pattern>,
    excludes: Vec<Pattern>,
    dotfiles: bool,
    directories: bool,
}

impl File {
    pub fn new() -> Self {
        File::default()
    }

    /// Accepts only paths matching one of the include globs (all paths if none is given).
    pub fn include(mut self, pattern: &str) -> Result<Self, GrammarError> {
        self.includes.push(compile_glob(pattern)?);
        Ok(self)
    }

    /// Rejects paths matching the glob.
    pub fn exclude(mut self, pattern: &str) -> Result<Self, GrammarError> {
        self.excludes.push(compile_glob(pattern)?);
        Ok(self)
    }

    /// Whether files whose names start with a dot are accepted.
    pub fn dotfiles(mut self, allow: bool) -> Self {
        self.dotfiles = allow;
        self
    }

    /// Whether existing directories are accepted.
    pub fn directories(mut self, allow: bool) -> Self {
        self.directories = allow;
        self
    }

    fn accepts(&self, path: &str, allow_directories: bool) -> bool {
        if Path::new(path).is_dir() {
            return allow_directories;
        }
        if !self.dotfiles && base_name(path).starts_with('.') {
            return false;
        }
        if self.excludes.iter().any(|pattern| pattern.matches(path)) {
            return false;
        }
        self.includes.is_empty() || self.includes.iter().any(|pattern| pattern.matches(path))
    }
}

fn compile_glob(pattern: &str) -> Result<Pattern, GrammarError> {
    Pattern::new(pattern).map_err(|source| GrammarError::InvalidGlob {
        pattern: pattern.to_string(),
        source,
    })
}

impl VariableKind for File {
    fn name(&self) -> &'static str {
        "path"
    }

    fn pattern(&self) -> Option<Cow<'static, str>> {
        Some(".+".into())
    }

    fn parse(&self, text: &str) -> Result<Value, ValueError> {
        let unquoted = unquote(text);
        let path = expand_home(&unquoted);
        if self.accepts(&path, self.directories) {
            Ok(Value::Path(PathBuf::from(path.as_ref())))
        } else {
            Err(invalid(text, self))
        }
    }

    fn candidates(&self, text: &str) -> Vec<String> {
        let quote = match text.chars().next() {
            Some(quote @ ('\'' | '"')) => Some(quote),
            _ => None,
        };
        let text = unquote(text);
        let short_home = text
            .starts_with('~')
            .then(|| text.split('/').next().unwrap_or("~").to_string());
        let expanded_home = short_home.as_deref().map(expand_home);
        let expanded = expand_home(&text);

        let (dir, file) = match expanded.rfind('/') {
            Some(index) => expanded.split_at(index + 1),
            None => ("", expanded.as_ref()),
        };
        let listed_dir = if dir.is_empty() { "." } else { dir };

        let clean = |path: String| match (&short_home, &expanded_home) {
            (Some(short), Some(expanded)) if path.starts_with(expanded.as_ref()) => {
                format!("{}{}", short, &path[expanded.len()..])
            }
            _ => path,
        };

        let mut names = reduce_dir_contents(Path::new(listed_dir), Vec::new(), |mut names, item| {
            let is_visible = self.dotfiles || !item.starts_with('.');
            let full = format!("{}{}", dir, item);
            if item.starts_with(file) && is_visible && self.accepts(&full, true) {
                names.push(item.to_string());
            }
            names
        });
        names.sort();

        if let [single] = names.as_slice() {
            let full = format!("{}{}", dir, single);
            return if Path::new(&full).is_dir() {
                vec![quote_path(&clean(format!("{}/", full)), quote, false)]
            } else {
                vec![format!("{} ", quote_path(&clean(full), quote, true))]
            };
        }
        names
            .into_iter()
            .map(|name| quote_path(&clean(format!("{}{}", dir, name)), quote, false))
            .collect()
    }
}

/// Quotes the path if it was typed quoted or would otherwise not form a single token
///
/// The closing quote is only added to a path that is complete. Quotes of the same kind and
/// backslashes are escaped.
fn quote_path(path: &str, quote: Option<char>, complete: bool) -> String {
    let needs_quotes = |ch: char| ch.is_whitespace() || matches!(ch, '\'' | '"' | '\\');
    let quote = match quote {
        Some(quote) => quote,
        None if path.contains(needs_quotes) => '\'',
        None => return path.to_string(),
    };

    let mut quoted = String::with_capacity(path.len() + 2);
    quoted.push(quote);
    for ch in path.chars() {
        if ch == quote || ch == '\\' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    if complete {
        quoted.push(quote);
    }
    quoted
}
