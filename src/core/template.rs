use crate::core::process::{CommandLine, Properties};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

static ENV_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\$ENV\("(.*?)"\)"#).expect("valid ENV pattern"));
static PROPERTY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\$SYSTEM_PROPERTY\("(.*?)"\)"#).expect("valid SYSTEM_PROPERTY pattern")
});
static ARG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$ARG\((\d+)\)").expect("valid ARG pattern"));
static JOB_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^attempt_(.*?)_\w_.*$").expect("valid job pattern"));

const CLASSNAME: &str = "$CLASSNAME";

/// 把 tag 裡的 placeholder 換成實際值。
///
/// 支援 `$ENV("KEY")`、`$SYSTEM_PROPERTY("KEY")`、`$ARG(n)` 與 `$CLASSNAME`，
/// 依此順序逐一處理。找不到值的 placeholder 原樣保留，所以這裡永遠不會失敗。
#[derive(Debug, Clone)]
pub struct IdentityTemplateResolver {
    env: HashMap<String, String>,
    properties: Properties,
    command_line: CommandLine,
}

impl IdentityTemplateResolver {
    pub fn new(
        env: HashMap<String, String>,
        properties: Properties,
        command_line: CommandLine,
    ) -> Self {
        Self {
            env,
            properties,
            command_line,
        }
    }

    /// 以目前 process 的環境變數建立
    pub fn from_process(properties: Properties, command_line: CommandLine) -> Self {
        Self::new(std::env::vars().collect(), properties, command_line)
    }

    /// 展開使用者 tag，再附加 `job_<id>` 與 `user_<name>`（這兩個不展開）
    pub fn resolve_tags(&self, raw_tags: &[String]) -> Vec<String> {
        let mut tags: Vec<String> = raw_tags.iter().map(|t| self.expand(t)).collect();

        if let Some(job) = self.job_id() {
            tags.push(format!("job_{}", job));
        }
        if let Some(user) = self.properties.user_name() {
            tags.push(format!("user_{}", user));
        }

        tags
    }

    pub fn expand(&self, tag: &str) -> String {
        let tag = substitute(&ENV_PATTERN, tag, |caps| {
            self.env.get(&caps[1]).cloned()
        });

        let tag = substitute(&PROPERTY_PATTERN, &tag, |caps| {
            self.properties.get(&caps[1]).map(str::to_string)
        });

        let tag = substitute(&ARG_PATTERN, &tag, |caps| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| self.command_line.arg(index))
                .map(str::to_string)
        });

        match self.command_line.entry_point_name() {
            Some(name) => tag.replace(CLASSNAME, name),
            None => tag,
        }
    }

    /// 第一個符合 `attempt_<jobid>_<letter>_...` 的 token
    pub fn job_id(&self) -> Option<String> {
        self.command_line
            .tokens()
            .iter()
            .find_map(|token| JOB_PATTERN.captures(token).map(|caps| caps[1].to_string()))
    }
}

/// 單次掃描取代，解析不到的 match 保留原文
fn substitute<F>(pattern: &Regex, tag: &str, lookup: F) -> String
where
    F: Fn(&Captures) -> Option<String>,
{
    pattern
        .replace_all(tag, |caps: &Captures| {
            lookup(caps).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::process::USER_NAME;

    fn resolver(env: &[(&str, &str)], props: &[(&str, &str)], cmd: &str) -> IdentityTemplateResolver {
        let env = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let properties = props
            .iter()
            .fold(Properties::new(), |p, (k, v)| p.with(*k, *v));
        IdentityTemplateResolver::new(env, properties, CommandLine::parse(cmd))
    }

    #[test]
    fn test_env_placeholder() {
        let r = resolver(&[("DC", "eu1")], &[], "");
        assert_eq!(r.expand(r#"dc_$ENV("DC")"#), "dc_eu1");
        assert_eq!(r.expand(r#"$ENV("DC")-$ENV("DC")"#), "eu1-eu1");
        assert_eq!(r.expand(r#"dc_$ENV("MISSING")"#), r#"dc_$ENV("MISSING")"#);
    }

    #[test]
    fn test_system_property_placeholder() {
        let r = resolver(&[], &[("app.version", "1.2.3")], "");
        assert_eq!(r.expand(r#"v$SYSTEM_PROPERTY("app.version")"#), "v1.2.3");
        assert_eq!(
            r.expand(r#"$SYSTEM_PROPERTY("nope")"#),
            r#"$SYSTEM_PROPERTY("nope")"#
        );
    }

    #[test]
    fn test_arg_placeholder() {
        let r = resolver(&[], &[], "org.example.Main input.csv");
        assert_eq!(r.expand("$ARG(0)"), "org.example.Main");
        assert_eq!(r.expand("file_$ARG(1)_$ARG(1)"), "file_input.csv_input.csv");
        assert_eq!(r.expand("$ARG(2)"), "$ARG(2)");
        assert_eq!(r.expand("$ARG(99999999999999999999999)"), "$ARG(99999999999999999999999)");
    }

    #[test]
    fn test_classname_placeholder() {
        let r = resolver(&[], &[], "org.example.Main arg");
        assert_eq!(r.expand("app_$CLASSNAME"), "app_Main");

        let empty = resolver(&[], &[], "");
        assert_eq!(empty.expand("app_$CLASSNAME"), "app_$CLASSNAME");
    }

    #[test]
    fn test_mixed_placeholders_in_one_tag() {
        let r = resolver(&[("X", "ex")], &[], "tool.Runner first");
        assert_eq!(
            r.expand(r#"job_$ENV("X")_$ARG(1)_$CLASSNAME"#),
            "job_ex_first_Runner"
        );
    }

    #[test]
    fn test_unknown_syntax_left_verbatim() {
        let r = resolver(&[], &[], "main");
        assert_eq!(r.expand("$FOO(bar)"), "$FOO(bar)");
        assert_eq!(r.expand("plain"), "plain");
    }

    #[test]
    fn test_job_tag_derived_from_attempt_token() {
        let r = resolver(
            &[],
            &[],
            "org.apache.hadoop.mapred.YarnChild 10.0.0.1 attempt_1410450250506_0003_m_000000_0 4",
        );
        assert_eq!(r.job_id().as_deref(), Some("1410450250506_0003"));
        let tags = r.resolve_tags(&["foo".to_string()]);
        assert_eq!(tags, vec!["foo", "job_1410450250506_0003"]);
    }

    #[test]
    fn test_no_job_tag_without_attempt_token() {
        let r = resolver(&[], &[], "main attempt_nothing");
        assert_eq!(r.job_id(), None);
        assert!(r.resolve_tags(&[]).is_empty());
    }

    #[test]
    fn test_user_tag_appended_after_user_tags_and_not_expanded() {
        let r = resolver(&[("U", "x")], &[(USER_NAME, r#"$ENV("U")"#)], "main");
        let tags = r.resolve_tags(&["a".to_string(), "b".to_string()]);
        assert_eq!(tags, vec!["a", "b", r#"user_$ENV("U")"#]);
    }
}
