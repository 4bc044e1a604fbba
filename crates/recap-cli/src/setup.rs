//! `--setup` text.

use recap_chat::config::{DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL, DEFAULT_OPENAI_MODEL};
use recap_chat::BackendKind;

/// Setup instructions for one backend, or all of them.
pub fn instructions(backend: Option<BackendKind>) -> String {
    match backend {
        Some(kind) => section(kind),
        None => [BackendKind::Ollama, BackendKind::OpenAI, BackendKind::Azure]
            .into_iter()
            .map(section)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn section(kind: BackendKind) -> String {
    match kind {
        BackendKind::Ollama => format!(
            "\
== Ollama (local) ==
1. Install Ollama: https://ollama.com/download
2. Start the server:      ollama serve
3. Pull a model:          ollama pull {model}
4. Optional overrides:    OLLAMA_BASE_URL (default {url}), OLLAMA_MODEL
Run: recap <folder> --backend ollama
",
            model = DEFAULT_OLLAMA_MODEL,
            url = DEFAULT_OLLAMA_URL
        ),
        BackendKind::OpenAI => format!(
            "\
== OpenAI ==
1. Create an API key at https://platform.openai.com/api-keys
2. Put it in .env or the environment:
     OPENAI_API_KEY=sk-...
3. Optional overrides:    OPENAI_MODEL (default {model}), OPENAI_BASE_URL
Run: recap <folder> --backend openai
",
            model = DEFAULT_OPENAI_MODEL
        ),
        BackendKind::Azure => "\
== Azure OpenAI ==
1. Deploy a chat model in your Azure OpenAI resource.
2. Put these in .env or the environment:
     AZURE_OPENAI_API_KEY=...
     AZURE_OPENAI_ENDPOINT=https://<resource>.openai.azure.com
     AZURE_OPENAI_DEPLOYMENT=<deployment name>
3. Optional override:     AZURE_OPENAI_API_VERSION
Run: recap <folder> --backend azure
"
        .to_string(),
    }
}
