//! Signature and doc-comment rendering.
//!
//! Signatures use the source-level form: types appear as written in the
//! declaring file (`*English`, `sync.Mutex`), not fully qualified. Qualified
//! renderings live on the receiver field and in the canonical comparison
//! strings built by the resolver.

/// One group of a parameter or result list: `a, b string` or a bare `string`.
#[derive(Debug, Clone, Default)]
pub(crate) struct ParamGroup {
    pub names: Vec<String>,
    pub type_text: String,
    pub variadic: bool,
}

impl ParamGroup {
    fn render(&self) -> String {
        let ty = if self.variadic {
            format!("...{}", self.type_text)
        } else {
            self.type_text.clone()
        };
        if self.names.is_empty() {
            ty
        } else {
            format!("{} {}", self.names.join(", "), ty)
        }
    }
}

pub(crate) fn render_params(groups: &[ParamGroup]) -> String {
    let inner: Vec<String> = groups.iter().map(ParamGroup::render).collect();
    format!("({})", inner.join(", "))
}

/// Renders a result list the way Go prints it: nothing for zero results, a
/// bare type for exactly one unnamed result, parentheses otherwise.
pub(crate) fn render_results(groups: &[ParamGroup]) -> String {
    match groups {
        [] => String::new(),
        [only] if only.names.is_empty() => format!(" {}", only.render()),
        _ => {
            let inner: Vec<String> = groups.iter().map(ParamGroup::render).collect();
            format!(" ({})", inner.join(", "))
        }
    }
}

/// Formats a function or method signature as a Go source string. A blank or
/// absent receiver name keeps the parentheses and drops the name.
pub(crate) fn render_signature(
    name: &str,
    receiver: Option<(&str, &str)>,
    params: &[ParamGroup],
    results: &[ParamGroup],
) -> String {
    let mut sig = String::from("func ");
    if let Some((recv_name, recv_type)) = receiver {
        if recv_name.is_empty() || recv_name == "_" {
            sig.push_str(&format!("({recv_type}) "));
        } else {
            sig.push_str(&format!("({recv_name} {recv_type}) "));
        }
    }
    sig.push_str(name);
    sig.push_str(&render_params(params));
    sig.push_str(&render_results(results));
    sig
}

/// Doc attribution for a spec inside a grouped declaration: the spec's own
/// doc wins; the group doc applies only when the group holds a single spec.
pub(crate) fn spec_doc(own: String, group: &str, spec_count: usize) -> String {
    if !own.is_empty() {
        own
    } else if spec_count == 1 {
        group.to_string()
    } else {
        String::new()
    }
}

/// Strips comment markers from a run of raw comment nodes and joins the
/// remaining text, mirroring what Go's `CommentGroup.Text` produces.
pub(crate) fn clean_comment(raw_comments: &[&str]) -> String {
    let mut lines = Vec::new();
    for raw in raw_comments {
        if let Some(rest) = raw.strip_prefix("//") {
            lines.push(rest.strip_prefix(' ').unwrap_or(rest).trim_end().to_string());
        } else {
            let body = raw
                .strip_prefix("/*")
                .and_then(|s| s.strip_suffix("*/"))
                .unwrap_or(raw);
            for line in body.lines() {
                lines.push(line.trim().to_string());
            }
        }
    }
    lines.join("\n").trim().to_string()
}

/// Collapses a multi-line type expression to a single-line rendering.
pub(crate) fn normalize_ws(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("( ", "(")
        .replace(" )", ")")
        .replace("[ ", "[")
        .replace(" ]", "]")
        .replace(" ,", ",")
        .replace("{ ", "{")
        .replace(" }", "}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(names: &[&str], ty: &str) -> ParamGroup {
        ParamGroup {
            names: names.iter().map(|n| n.to_string()).collect(),
            type_text: ty.to_string(),
            variadic: false,
        }
    }

    #[test]
    fn signature_forms() {
        let n = group(&["n"], "int");
        let b = group(&[], "bool");

        assert_eq!(render_signature("Foo", None, &[], &[]), "func Foo()");
        assert_eq!(
            render_signature("Bar", None, &[n.clone()], &[b.clone()]),
            "func Bar(n int) bool"
        );
        assert_eq!(
            render_signature("Method", Some(("s", "*S")), &[n.clone()], &[b.clone()]),
            "func (s *S) Method(n int) bool"
        );
        assert_eq!(
            render_signature("Method", Some(("_", "*S")), &[n.clone()], &[b.clone()]),
            "func (*S) Method(n int) bool"
        );
        assert_eq!(
            render_signature("Method", Some(("", "*S")), &[n], &[b]),
            "func (*S) Method(n int) bool"
        );
    }

    #[test]
    fn result_forms() {
        assert_eq!(render_results(&[]), "");
        assert_eq!(render_results(&[group(&[], "string")]), " string");
        assert_eq!(
            render_results(&[group(&[], "string"), group(&[], "error")]),
            " (string, error)"
        );
        assert_eq!(render_results(&[group(&["out"], "string")]), " (out string)");
    }

    #[test]
    fn variadic_params() {
        let sep = group(&["sep"], "string");
        let mut parts = group(&["parts"], "string");
        parts.variadic = true;
        assert_eq!(
            render_signature("Variadic", None, &[sep, parts], &[group(&[], "string")]),
            "func Variadic(sep string, parts ...string) string"
        );
    }

    #[test]
    fn group_doc_attribution() {
        assert_eq!(spec_doc("spec doc".into(), "group doc", 1), "spec doc");
        assert_eq!(spec_doc(String::new(), "group doc", 1), "group doc");
        assert_eq!(spec_doc(String::new(), "group doc", 3), "");
        assert_eq!(spec_doc("spec doc".into(), "", 2), "spec doc");
    }

    #[test]
    fn comment_cleanup() {
        assert_eq!(clean_comment(&["// one", "// two"]), "one\ntwo");
        assert_eq!(clean_comment(&["//no space"]), "no space");
        assert_eq!(clean_comment(&["/* block */"]), "block");
    }
}
