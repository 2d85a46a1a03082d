use std::collections::HashMap;

pub const USER_NAME: &str = "user.name";

/// 啟動時建立的 process 屬性，之後不再變動
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    values: HashMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// 從目前 process 的環境取預設值
    pub fn from_process() -> Self {
        let mut values = HashMap::new();

        if let Some(user) = std::env::var("USER")
            .ok()
            .or_else(|| std::env::var("USERNAME").ok())
            .filter(|u| !u.trim().is_empty())
        {
            values.insert(USER_NAME.to_string(), user);
        }
        values.insert("os.name".to_string(), std::env::consts::OS.to_string());
        values.insert("os.arch".to_string(), std::env::consts::ARCH.to_string());
        if let Ok(dir) = std::env::current_dir() {
            values.insert("user.dir".to_string(), dir.display().to_string());
        }

        Self { values }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// 套用 `KEY=VALUE` 形式的覆寫，沒有 `=` 的項目當成空字串
    pub fn with_overrides<I, S>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for entry in overrides {
            let entry = entry.as_ref();
            match entry.split_once('=') {
                Some((key, value)) => self.values.insert(key.trim().to_string(), value.to_string()),
                None => self.values.insert(entry.trim().to_string(), String::new()),
            };
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn user_name(&self) -> Option<&str> {
        self.get(USER_NAME)
    }
}

/// 被監控 process 的命令列，以空白切成 token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    tokens: Vec<String>,
}

impl CommandLine {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = tokens
            .into_iter()
            .flat_map(|t| {
                t.as_ref()
                    .split_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        Self { tokens }
    }

    pub fn parse(line: &str) -> Self {
        Self::new([line])
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// 第一個 token 最後一段 `.` 之後的名稱，例如 `org.example.Main` -> `Main`
    pub fn entry_point_name(&self) -> Option<&str> {
        let first = self.tokens.first()?;
        let trimmed = first.trim_end_matches('.');
        if trimmed.is_empty() {
            return None;
        }
        trimmed.rsplit('.').next()
    }
}
