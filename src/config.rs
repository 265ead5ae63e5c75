use std::env;
use secrecy::SecretString;

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub topics_collection: String,
    pub questions_collection: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub llm_api_key: SecretString,
    pub llm_api_base: String,
    pub llm_model: String,
    pub llm_max_tokens: u32,
    pub llm_temperature: f32,
    pub llm_top_p: f32,
    pub llm_timeout_secs: u64,
    pub fetch_timeout_secs: u64,
    pub web_text_limit: usize,
    pub pdf_text_limit: usize,
    pub max_upload_bytes: usize,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        let api_key = env::var("LLM_API_KEY")
            .or_else(|_| env::var("GROQ_API_KEY"))
            .unwrap_or_default();

        Self {
            mongo_conn_string: env_or("MONGO_CONN_STRING", "mongodb://localhost:27017"),
            mongo_db_name: env_or("MONGO_DB_NAME", "quiz-maker-local"),
            topics_collection: env_or("TOPICS_COLLECTION", "quiz_topics"),
            questions_collection: env_or("QUESTIONS_COLLECTION", "quiz_questions"),
            web_server_host: env_or("WEB_SERVER_HOST", "localhost"),
            web_server_port: env_parse("WEB_SERVER_PORT", 8080),
            llm_api_key: SecretString::from(api_key),
            llm_api_base: env_or("LLM_API_BASE", "https://api.groq.com/openai/v1"),
            llm_model: env_or("LLM_MODEL", "llama-3.3-70b-versatile"),
            llm_max_tokens: env_parse("LLM_MAX_TOKENS", 2000),
            llm_temperature: env_parse("LLM_TEMPERATURE", 0.8),
            llm_top_p: env_parse("LLM_TOP_P", 1.0),
            llm_timeout_secs: env_parse("LLM_TIMEOUT_SECS", 120),
            fetch_timeout_secs: env_parse("FETCH_TIMEOUT_SECS", 30),
            web_text_limit: env_parse("WEB_TEXT_LIMIT", 4000),
            pdf_text_limit: env_parse("PDF_TEXT_LIMIT", 8000),
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", 20 * 1024 * 1024),
        }
    }

    /// Validate that production-critical configuration is set
    /// Panics if the completion provider cannot be authenticated
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        if self.llm_api_key.expose_secret().trim().is_empty() {
            panic!(
                "FATAL: LLM_API_KEY is not set! Set LLM_API_KEY (or GROQ_API_KEY) to the completion provider key."
            );
        }

        if self.web_text_limit == 0 || self.pdf_text_limit == 0 {
            panic!("FATAL: WEB_TEXT_LIMIT and PDF_TEXT_LIMIT must be greater than zero.");
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "quiz-maker-test".to_string(),
            topics_collection: "quiz_topics".to_string(),
            questions_collection: "quiz_questions".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            llm_api_key: SecretString::from("test_llm_key".to_string()),
            llm_api_base: "http://localhost:9999/v1".to_string(),
            llm_model: "test-model".to_string(),
            llm_max_tokens: 2000,
            llm_temperature: 0.8,
            llm_top_p: 1.0,
            llm_timeout_secs: 5,
            fetch_timeout_secs: 5,
            web_text_limit: 4000,
            pdf_text_limit: 8000,
            max_upload_bytes: 1024 * 1024,
        }
    }
}
