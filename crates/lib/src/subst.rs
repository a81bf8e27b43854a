//! Placeholder substitution for command templates.
//!
//! A command template may reference values as `$NAME`, `$(NAME)` or
//! `${NAME}`, where NAME is one or more word characters (ASCII letters,
//! digits, underscore). `$$` escapes to a literal `$` with no further lookup.
//!
//! Resolution order per placeholder:
//!
//! 1. `OUTPUT` on a file-producing target expands to its output path.
//! 2. A dependency-group name expands to the space-joined textual form of
//!    every dependency in that group, in declared order.
//! 3. A variable from the store expands to its value.
//! 4. Otherwise the expansion fails with [`BuildError::UnsetVariable`].
//!
//! Text that merely looks like a placeholder but is malformed (a lone `$`,
//! an unclosed `$(NAME`, an empty `$()`) passes through unchanged, so shell
//! constructs survive without escaping.
//!
//! Expansion is a pure function of (template, node, store) and can be
//! re-invoked safely.

use std::path::Path;

use crate::error::BuildError;
use crate::target::DepGroups;
use crate::vars::VarStore;

fn is_word(c: char) -> bool {
  c.is_ascii_alphanumeric() || c == '_'
}

/// Expand every placeholder in `template`.
///
/// `output` is the owning target's output path, present only for
/// file-producing targets; `depends` are its dependency groups.
pub fn expand(
  template: &str,
  output: Option<&Path>,
  depends: &DepGroups,
  vars: &VarStore,
) -> Result<String, BuildError> {
  let mut expanded = String::with_capacity(template.len());
  let mut chars = template.chars().peekable();

  while let Some(ch) = chars.next() {
    if ch != '$' {
      expanded.push(ch);
      continue;
    }
    match chars.peek().copied() {
      // $$ -> literal $, never looked up again
      Some('$') => {
        chars.next();
        expanded.push('$');
      }
      Some(open @ ('(' | '{')) => {
        chars.next();
        let close = if open == '(' { ')' } else { '}' };
        let mut name = String::new();
        while let Some(&c) = chars.peek() {
          if !is_word(c) {
            break;
          }
          name.push(c);
          chars.next();
        }
        if !name.is_empty() && chars.peek() == Some(&close) {
          chars.next();
          expanded.push_str(&resolve(&name, output, depends, vars)?);
        } else {
          // Malformed; emit the consumed text verbatim.
          expanded.push('$');
          expanded.push(open);
          expanded.push_str(&name);
        }
      }
      Some(c) if is_word(c) => {
        let mut name = String::new();
        while let Some(&c) = chars.peek() {
          if !is_word(c) {
            break;
          }
          name.push(c);
          chars.next();
        }
        expanded.push_str(&resolve(&name, output, depends, vars)?);
      }
      // Lone $ at the end or before a non-word character.
      _ => expanded.push('$'),
    }
  }

  Ok(expanded)
}

fn resolve(
  name: &str,
  output: Option<&Path>,
  depends: &DepGroups,
  vars: &VarStore,
) -> Result<String, BuildError> {
  if name == "OUTPUT"
    && let Some(path) = output
  {
    return Ok(path.display().to_string());
  }
  if let Some(deps) = depends.get(name) {
    let parts: Vec<String> = deps.iter().map(ToString::to_string).collect();
    return Ok(parts.join(" "));
  }
  if let Some(value) = vars.get(name) {
    return Ok(value.to_string());
  }
  Err(BuildError::UnsetVariable(name.to_string()))
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::target::{BuildTarget, Dep};

  fn vars(pairs: &[(&str, &str)]) -> VarStore {
    let mut store = VarStore::new();
    for (name, value) in pairs {
      store.set(*name, *value);
    }
    store
  }

  fn no_deps() -> DepGroups {
    DepGroups::new()
  }

  #[test]
  fn placeholder_forms_are_equivalent() {
    let store = vars(&[("A", "a")]);
    for template in ["$A", "$(A)", "${A}"] {
      let out = expand(template, None, &no_deps(), &store).unwrap();
      assert_eq!(out, "a", "form {template}");
    }
  }

  #[test]
  fn adjacent_and_embedded_placeholders() {
    let store = vars(&[("A", "a"), ("B", "b"), ("C", "c")]);
    assert_eq!(expand("echo $A$B$C", None, &no_deps(), &store).unwrap(), "echo abc");
    assert_eq!(expand("echo $(A)a${B}", None, &no_deps(), &store).unwrap(), "echo aab");
    assert_eq!(
      expand("echo $A/next/to/path", None, &no_deps(), &store).unwrap(),
      "echo a/next/to/path"
    );
  }

  #[test]
  fn placeholders_at_edges() {
    let store = vars(&[("ECHO", "echo"), ("DEV_NULL", "/dev/null")]);
    assert_eq!(
      expand("$ECHO edges > $DEV_NULL", None, &no_deps(), &store).unwrap(),
      "echo edges > /dev/null"
    );
  }

  #[test]
  fn dollar_escape_is_not_recursive() {
    let store = vars(&[("VAR", "boom")]);
    assert_eq!(expand("echo $$VAR", None, &no_deps(), &store).unwrap(), "echo $VAR");
    assert_eq!(expand("$$$$", None, &no_deps(), &store).unwrap(), "$$");
  }

  #[test]
  fn malformed_placeholders_pass_through() {
    let store = vars(&[("A", "a")]);
    assert_eq!(expand("cost: 5$", None, &no_deps(), &store).unwrap(), "cost: 5$");
    assert_eq!(expand("$ A", None, &no_deps(), &store).unwrap(), "$ A");
    assert_eq!(expand("$()", None, &no_deps(), &store).unwrap(), "$()");
    assert_eq!(expand("$(A", None, &no_deps(), &store).unwrap(), "$(A");
    assert_eq!(expand("${A )", None, &no_deps(), &store).unwrap(), "${A )");
  }

  #[test]
  fn output_expands_for_build_targets_only() {
    let store = VarStore::new();
    let out = expand("touch $OUTPUT", Some(Path::new("/tmp/x.txt")), &no_deps(), &store).unwrap();
    assert_eq!(out, "touch /tmp/x.txt");

    // Without an output path, OUTPUT falls through to groups/vars and fails.
    let err = expand("touch $OUTPUT", None, &no_deps(), &store).unwrap_err();
    assert!(matches!(err, BuildError::UnsetVariable(name) if name == "OUTPUT"));
  }

  #[test]
  fn group_expands_in_order_with_repeats() {
    let a = Arc::new(BuildTarget::new("true", "/tmp/a.o"));
    let b = Arc::new(BuildTarget::new("true", "/tmp/b.o"));
    let mut depends = DepGroups::new();
    depends.insert("OBJS".into(), vec![Dep::from(&b), Dep::from(&a), Dep::from(&b)]);

    let store = VarStore::new();
    let out = expand("cc $OBJS", None, &depends, &store).unwrap();
    assert_eq!(out, "cc /tmp/b.o /tmp/a.o /tmp/b.o");
  }

  #[test]
  fn group_wins_over_variable() {
    let mut depends = DepGroups::new();
    depends.insert("SRC".into(), vec![Dep::from(Path::new("main.c"))]);
    let store = vars(&[("SRC", "from-store")]);
    assert_eq!(expand("cc $SRC", None, &depends, &store).unwrap(), "cc main.c");
  }

  #[test]
  fn empty_group_expands_to_nothing() {
    let mut depends = DepGroups::new();
    depends.insert("OBJS".into(), vec![]);
    let store = VarStore::new();
    assert_eq!(expand("cc [$OBJS]", None, &depends, &store).unwrap(), "cc []");
  }

  #[test]
  fn unset_variable_names_the_placeholder() {
    let store = VarStore::new();
    let err = expand("echo $UNSET_VAR", None, &no_deps(), &store).unwrap_err();
    assert!(matches!(&err, BuildError::UnsetVariable(name) if name == "UNSET_VAR"));
    assert!(err.to_string().contains("UNSET_VAR"));
  }
}
