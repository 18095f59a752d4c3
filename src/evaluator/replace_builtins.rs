//! Built-in replace functions

use super::visit::convert_backrefs;
use super::Evaluator;
use crate::diagnostics::DiagnosticCode;
use crate::error::EvalResult;
use crate::model::{format_value, parse_c_int, split_value_list, ProKey, ProString, ProStringList};
use crate::paths::{absolute_path, dir_part, file_name, relative_path, FixFlags};
use crate::registry::ExpandFunc;
use regex::Regex;

/// Resolve a possibly negative index against a list of `len` items
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let index = if index < 0 { len + index } else { index };
    (0..len).contains(&index).then_some(index as usize)
}

/// `%1`..`%9` substitution
fn sprintf(format: &str, args: &[ProString]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '%' {
            if let Some(n) = chars.peek().and_then(|d| d.to_digit(10)).filter(|n| *n > 0) {
                chars.next();
                out.push_str(args.get(n as usize).map_or("", ProString::as_str));
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// `\n`, `\t`, `\r` and `\\` escapes
fn escape_expand(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            _ => {
                out.push('\\');
                continue;
            }
        }
        chars.next();
    }
    out
}

/// Fields `begin..=end` of `value` split on `separator`; negative indices
/// count from the end
fn section(value: &str, separator: &str, begin: i64, end: i64) -> String {
    let fields: Vec<&str> = value.split(separator).collect();
    let len = fields.len() as i64;
    let normalize = |i: i64| if i < 0 { len + i } else { i };
    let (begin, end) = (normalize(begin).max(0), normalize(end).min(len - 1));
    if begin > end {
        return String::new();
    }
    fields[begin as usize..=end as usize].join(separator)
}

fn title_case(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Evaluator {
    pub(crate) fn evaluate_builtin_replace(&mut self, func: ExpandFunc, args: &[ProString]) -> EvalResult<ProStringList> {
        let arg = |i: usize| args.get(i).map_or("", ProString::as_str);
        let per_arg = |f: fn(&str) -> String| -> ProStringList {
            args.iter().map(|a| ProString::from(f(a))).collect()
        };

        let result = match func {
            ExpandFunc::Member => self.member(arg(0), &args[1..]),
            ExpandFunc::First => self.values(arg(0)).first().cloned().into_iter().collect(),
            ExpandFunc::Last => self.values(arg(0)).last().cloned().into_iter().collect(),
            ExpandFunc::Size => ProStringList::single(self.values(arg(0)).len().to_string()),
            ExpandFunc::StrSize => ProStringList::single(arg(0).chars().count().to_string()),
            ExpandFunc::Cat => self.cat(arg(0), arg(1)),
            ExpandFunc::Eval => self.values(arg(0)),
            ExpandFunc::List => {
                let values: ProStringList = args.iter().flat_map(|a| split_value_list(a)).collect();
                self.tmp_counter += 1;
                let key = format!(".QMAKE_INTERNAL_TMP_variableName_{}", self.tmp_counter);
                self.stack.set(ProKey::from(key.as_str()), values);
                ProStringList::single(key)
            }
            ExpandFunc::Sprintf => ProStringList::single(sprintf(arg(0), args)),
            ExpandFunc::Join => {
                let values = self.values(arg(0));
                if values.is_empty() {
                    ProStringList::new()
                } else {
                    ProStringList::single(format!("{}{}{}", arg(2), values.join(arg(1)), arg(3)))
                }
            }
            ExpandFunc::Split => {
                let separator = if args.len() > 1 { arg(1) } else { " " };
                self.values(arg(0))
                    .iter()
                    .flat_map(|v| {
                        v.split(separator)
                            .filter(|part| !part.is_empty())
                            .map(ProString::from)
                            .collect::<Vec<_>>()
                    })
                    .collect()
            }
            ExpandFunc::Basename => self
                .values(arg(0))
                .iter()
                .map(|v| ProString::from(file_name(v)))
                .collect(),
            ExpandFunc::Dirname => self
                .values(arg(0))
                .iter()
                .map(|v| ProString::from(v.rfind('/').map_or("", |i| &v[..i])))
                .collect(),
            ExpandFunc::Section => {
                let begin = parse_c_int(arg(2));
                let end = if args.len() > 3 { parse_c_int(arg(3)) } else { Some(-1) };
                let (Some(begin), Some(end)) = (begin, end) else {
                    self.report(DiagnosticCode::Evaluation, "section(): begin and end must be numbers.");
                    return Ok(ProStringList::new());
                };
                self.values(arg(0))
                    .iter()
                    .map(|v| ProString::from(section(v, arg(1), begin, end)))
                    .collect()
            }
            ExpandFunc::Find => match self.regex(arg(1)) {
                Some(re) => self
                    .values(arg(0))
                    .iter()
                    .filter(|v| re.is_match(v))
                    .cloned()
                    .collect(),
                None => ProStringList::new(),
            },
            ExpandFunc::Unique => {
                let mut values = self.values(arg(0));
                values.dedup_keep_first();
                values
            }
            ExpandFunc::Reverse => self.values(arg(0)).iter().rev().cloned().collect(),
            ExpandFunc::Sorted => {
                let mut values = self.values(arg(0)).into_vec();
                values.sort();
                ProStringList::from(values)
            }
            ExpandFunc::TakeFirst | ExpandFunc::TakeLast => {
                let key = ProKey::from(arg(0));
                let list = self.stack.values_mut(&key);
                let taken = if list.is_empty() {
                    None
                } else if func == ExpandFunc::TakeFirst {
                    Some(list.remove(0))
                } else {
                    list.pop()
                };
                taken.into_iter().collect()
            }
            ExpandFunc::Quote => args.iter().cloned().collect(),
            ExpandFunc::EscapeExpand => per_arg(escape_expand),
            ExpandFunc::Upper => per_arg(str::to_uppercase),
            ExpandFunc::Lower => per_arg(str::to_lowercase),
            ExpandFunc::Title => per_arg(title_case),
            ExpandFunc::ReEscape => per_arg(regex::escape),
            ExpandFunc::ValEscape => self
                .values(arg(0))
                .iter()
                .map(|v| ProString::from(format_value(v)))
                .collect(),
            ExpandFunc::Files => self.files(arg(0), arg(1) == "true"),
            ExpandFunc::Replace => match self.regex(arg(1)) {
                Some(re) => {
                    let replacement = convert_backrefs(arg(2));
                    self.values(arg(0))
                        .iter()
                        .map(|v| ProString::from(re.replace_all(v, replacement.as_str()).into_owned()))
                        .collect()
                }
                None => ProStringList::new(),
            },
            ExpandFunc::EnumerateVars => self
                .stack
                .visible_keys()
                .into_iter()
                .filter(|k| !k.is_internal())
                .map(|k| ProString::from(k.as_str()))
                .collect(),
            ExpandFunc::AbsolutePath => {
                let base = self.base_dir(arg(1));
                ProStringList::single(self.fix_path(&absolute_path(arg(0), &base), FixFlags::CANONICALIZE))
            }
            ExpandFunc::RelativePath => {
                let base = self.base_dir(arg(1));
                let path = absolute_path(arg(0), &base);
                ProStringList::single(relative_path(&path, &base))
            }
            ExpandFunc::CleanPath => ProStringList::single(self.fix_path(arg(0), FixFlags::CANONICALIZE)),
            ExpandFunc::SystemPath => ProStringList::single(self.fix_path(arg(0), FixFlags::TO_LOCAL_SEPARATORS)),
            ExpandFunc::ShellPath => ProStringList::single(self.fix_path(arg(0), FixFlags::TO_TARGET_SEPARATORS)),
            ExpandFunc::Getenv => std::env::var(arg(0))
                .ok()
                .map(ProStringList::single)
                .unwrap_or_default(),
            ExpandFunc::NumAdd => {
                let mut sum: i64 = 0;
                for value in args {
                    match parse_c_int(value) {
                        Some(n) => sum = sum.wrapping_add(n),
                        None => {
                            self.report(
                                DiagnosticCode::Evaluation,
                                format!("num_add(): malformed number {value}."),
                            );
                            return Ok(ProStringList::new());
                        }
                    }
                }
                ProStringList::single(sum.to_string())
            }
        };
        Ok(result)
    }

    /// `member(var, start, end)` or `member(var, start..end)`
    fn member(&self, var: &str, range: &[ProString]) -> ProStringList {
        let values = self.values(var);
        let bounds = match range {
            [] => Some((0, 0)),
            [start] => match start.split_once("..") {
                Some((a, b)) => parse_c_int(a).zip(parse_c_int(b)),
                None => parse_c_int(start).map(|s| (s, s)),
            },
            [start, end, ..] => parse_c_int(start).zip(parse_c_int(end)),
        };
        let Some((start, end)) = bounds else {
            self.report(
                DiagnosticCode::Evaluation,
                format!("member() range '{}' is invalid.", range.iter().map(ProString::as_str).collect::<Vec<_>>().join(", ")),
            );
            return ProStringList::new();
        };
        let (Some(start), Some(end)) = (resolve_index(start, values.len()), resolve_index(end, values.len())) else {
            return ProStringList::new();
        };
        if start <= end {
            values[start..=end].iter().cloned().collect()
        } else {
            values[end..=start].iter().rev().cloned().collect()
        }
    }

    /// `cat(file, mode)`: `blob` keeps the text whole, `lines` yields one value
    /// per line, anything else splits lines into words
    fn cat(&self, file: &str, mode: &str) -> ProStringList {
        let path = self.resolve_path(file);
        if !self.file_info(&path).is_file {
            log::debug!("cat(): {path} is not a readable file");
            return ProStringList::new();
        }
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) => {
                self.report(DiagnosticCode::FileAccess, format!("Cannot read {path}: {err}"));
                return ProStringList::new();
            }
        };
        match mode {
            "blob" => ProStringList::single(contents),
            "lines" => contents.lines().map(ProString::from).collect(),
            _ => contents.lines().flat_map(|line| split_value_list(line)).collect(),
        }
    }

    /// `files(pattern, recursive)`, sorted; relative patterns yield relative
    /// results
    fn files(&self, pattern: &str, recursive: bool) -> ProStringList {
        let dir = self.current_dir().to_string();
        let absolute = absolute_path(pattern, &dir);
        let glob_pattern = if recursive {
            format!("{}/**/{}", dir_part(&absolute), file_name(&absolute))
        } else {
            absolute
        };
        let paths = match glob::glob(&glob_pattern) {
            Ok(paths) => paths,
            Err(err) => {
                self.report(DiagnosticCode::InvalidPattern, format!("files(): invalid pattern '{pattern}': {err}"));
                return ProStringList::new();
            }
        };
        let relative = crate::cache::is_relative_path(pattern);
        let mut found: Vec<ProString> = paths
            .filter_map(Result::ok)
            .map(|path| {
                let path = self.fix_path(&path.to_string_lossy(), FixFlags::TO_NORMAL_SEPARATORS);
                ProString::from(if relative { relative_path(&path, &dir) } else { path })
            })
            .collect();
        found.sort();
        ProStringList::from(found)
    }

    fn base_dir(&self, base: &str) -> String {
        if base.is_empty() {
            self.current_dir().to_string()
        } else {
            absolute_path(base, self.current_dir())
        }
    }

    fn regex(&self, pattern: &str) -> Option<Regex> {
        match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(err) => {
                self.report(DiagnosticCode::InvalidPattern, format!("Invalid regex '{pattern}': {err}"));
                None
            }
        }
    }
}
