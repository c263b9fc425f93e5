//! Interactive prompts: first-run configuration and the login form.

use anyhow::{bail, Context, Result};
use rolefit_client::{ApiClient, ClientConfig, MemoryTokenStore, TokenStoreKind};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use crate::output::yes_no;

/// Line-oriented prompts over any reader/writer pair.
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl Prompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            bail!("input closed before an answer was given");
        }
        Ok(line.trim().to_string())
    }

    pub fn with_default(&mut self, prompt: &str, default: &str) -> Result<String> {
        write!(self.output, "❓ {prompt} [{default}]: ")?;
        self.output.flush()?;
        let input = self.read_line()?;
        Ok(if input.is_empty() { default.to_string() } else { input })
    }

    pub fn with_default_parse<T>(&mut self, prompt: &str, default: &str) -> Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        loop {
            let input = self.with_default(prompt, default)?;
            match input.parse::<T>() {
                Ok(value) => return Ok(value),
                Err(e) => writeln!(self.output, "❌ Invalid input: {e}. Please try again.")?,
            }
        }
    }

    /// Ask until a non-empty answer is given.
    pub fn required(&mut self, prompt: &str) -> Result<String> {
        loop {
            write!(self.output, "❓ {prompt}: ")?;
            self.output.flush()?;
            let input = self.read_line()?;
            if !input.is_empty() {
                return Ok(input);
            }
            writeln!(self.output, "❌ A value is required.")?;
        }
    }

    pub fn yes_no(&mut self, prompt: &str, default: bool) -> Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            write!(self.output, "❓ {prompt} [{hint}]: ")?;
            self.output.flush()?;
            match self.read_line()?.to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "❌ Please enter 'y' or 'n'.")?,
            }
        }
    }

    pub fn with_options(&mut self, prompt: &str, options: &[(&str, &str)], default: &str) -> Result<String> {
        writeln!(self.output, "❓ {prompt}:")?;
        for (key, description) in options {
            let marker = if *key == default { "►" } else { " " };
            writeln!(self.output, "  {marker} {key} - {description}")?;
        }
        loop {
            write!(self.output, "Choice [{default}]: ")?;
            self.output.flush()?;
            let input = self.read_line()?;
            if input.is_empty() {
                return Ok(default.to_string());
            }
            if options.iter().any(|(key, _)| *key == input) {
                return Ok(input);
            }
            writeln!(self.output, "❌ Unknown choice '{input}'.")?;
        }
    }

    /// Password entry; the terminal echoes it.
    pub fn password(&mut self, prompt: &str) -> Result<String> {
        writeln!(self.output, "⚠️  WARNING: Password input will be visible on screen.")?;
        write!(self.output, "🔐 {prompt}: ")?;
        self.output.flush()?;
        self.read_line()
    }
}

/// Ask for whatever login credentials were not given on the command line.
pub fn login_form<R: BufRead, W: Write>(
    prompt: &mut Prompt<R, W>,
    username: Option<String>,
    password: Option<String>,
) -> Result<(String, String)> {
    let username = match username {
        Some(username) => username,
        None => prompt.required("Username")?,
    };
    let password = match password {
        Some(password) => password,
        None => prompt.password("Password")?,
    };
    Ok((username, password))
}

pub struct SetupWizard;

impl SetupWizard {
    pub async fn run(current: &ClientConfig) -> Result<()> {
        println!();
        println!("🖥️  ======================================");
        println!("   ROLEFIT CLIENT CONFIGURATION");
        println!("🖥️  ======================================");
        println!();

        let mut prompt = Prompt::stdio();
        let config = Self::collect(&mut prompt, current)?;

        println!();
        println!("🔍 Testing connection to {}...", config.api.base_url);
        let reachable = Self::test_backend(&config).await;
        if reachable {
            println!("✅ Backend reachable.");
        } else {
            println!("⚠️  Backend did not answer; you can still save and retry later.");
        }

        Self::display_summary(&config, reachable);

        if prompt.yes_no("💾 Save this configuration?", true)? {
            let path = config.save().await.context("Failed to save configuration")?;
            println!();
            println!("✅ Configuration saved to {}", path.display());
            println!("🚀 Run `rolefit login` to start a session.");
        } else {
            println!("❌ Configuration cancelled.");
        }
        Ok(())
    }

    fn collect<R: BufRead, W: Write>(prompt: &mut Prompt<R, W>, current: &ClientConfig) -> Result<ClientConfig> {
        let mut config = current.clone();

        println!("🌐 BACKEND");
        println!("────────────────────────────────────────");
        config.api.base_url = prompt.with_default("API base URL", &current.api.base_url)?;
        config.api.connect_timeout_secs =
            prompt.with_default_parse("Connect timeout (seconds)", &current.api.connect_timeout_secs.to_string())?;

        println!();
        println!("🔑 SESSION");
        println!("────────────────────────────────────────");
        let default_store = store_key(current.session.store);
        let store = prompt.with_options(
            "Where should the session token be kept",
            &[
                ("file", "session.toml in the config directory"),
                ("keyring", "OS keyring"),
                ("memory", "not persisted, login per command"),
            ],
            default_store,
        )?;
        config.session.store = parse_store(&store).unwrap_or(current.session.store);

        Ok(config)
    }

    /// Any HTTP answer, even 401, proves the backend is there.
    async fn test_backend(config: &ClientConfig) -> bool {
        let client = match ApiClient::from_config(config, Arc::new(MemoryTokenStore::new())) {
            Ok(client) => client,
            Err(e) => {
                println!("❌ {e}");
                return false;
            }
        };
        match client.auth().me().await {
            Err(e) if e.is_connectivity() => false,
            _ => true,
        }
    }

    fn display_summary(config: &ClientConfig, reachable: bool) {
        println!();
        println!("📋 CONFIGURATION SUMMARY");
        println!("========================================");
        println!("API base URL:    {}", config.api.base_url);
        println!("Connect timeout: {}s", config.api.connect_timeout_secs);
        println!("Token store:     {}", store_key(config.session.store));
        println!("Reachable:       {}", yes_no(reachable));
        println!();
    }
}

fn store_key(kind: TokenStoreKind) -> &'static str {
    match kind {
        TokenStoreKind::File => "file",
        TokenStoreKind::Keyring => "keyring",
        TokenStoreKind::Memory => "memory",
    }
}

fn parse_store(key: &str) -> Option<TokenStoreKind> {
    match key {
        "file" => Some(TokenStoreKind::File),
        "keyring" => Some(TokenStoreKind::Keyring),
        "memory" => Some(TokenStoreKind::Memory),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn scripted(input: &str) -> Prompt<Cursor<Vec<u8>>, Vec<u8>> {
        Prompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_default_on_empty_input() {
        let mut prompt = scripted("\n");
        assert_eq!(prompt.with_default("URL", "http://localhost:8000/api").unwrap(), "http://localhost:8000/api");
    }

    #[test]
    fn test_parse_retries_until_valid() {
        let mut prompt = scripted("ten\n15\n");
        let value: u64 = prompt.with_default_parse("Timeout", "10").unwrap();
        assert_eq!(value, 15);
        let written = String::from_utf8(prompt.output).unwrap();
        assert!(written.contains("Invalid input"));
    }

    #[test]
    fn test_yes_no() {
        let mut prompt = scripted("maybe\nn\n\n");
        assert!(!prompt.yes_no("Save?", true).unwrap());
        assert!(prompt.yes_no("Save?", true).unwrap());
    }

    #[test]
    fn test_closed_input_is_an_error() {
        let mut prompt = Prompt::new(&b""[..], Vec::new());
        assert!(prompt.required("Username").is_err());

        let mut prompt = Prompt::new(&b"abc\n"[..], Vec::new());
        assert!(prompt.with_default_parse::<u64>("Timeout", "soon").is_err());

        let mut prompt = scripted("");
        assert!(login_form(&mut prompt, None, None).is_err());
    }

    #[test]
    fn test_login_form_only_asks_missing() {
        let mut prompt = scripted("\nalice\nhunter2\n");
        let (user, pass) = login_form(&mut prompt, None, None).unwrap();
        assert_eq!(user, "alice");
        assert_eq!(pass, "hunter2");

        let mut prompt = scripted("s3cret\n");
        let (user, pass) = login_form(&mut prompt, Some("bob".into()), None).unwrap();
        assert_eq!((user.as_str(), pass.as_str()), ("bob", "s3cret"));
    }

    #[test]
    fn test_collect_keeps_defaults() {
        let mut prompt = scripted("\n\nkeyring\n");
        let config = SetupWizard::collect(&mut prompt, &ClientConfig::default()).unwrap();
        assert_eq!(config.api.base_url, rolefit_client::config::DEFAULT_BASE_URL);
        assert_eq!(config.api.connect_timeout_secs, 10);
        assert_eq!(config.session.store, TokenStoreKind::Keyring);
    }
}
