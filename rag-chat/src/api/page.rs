// Single-page form: question in, answer out. Vectors and chunks never reach the browser.

use std::convert::Infallible;

use ammonia::clean_text;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;
use warp::http::StatusCode;
use warp::Reply;

use crate::models::AskForm;
use crate::pipeline::RagPipeline;

const TITLE: &str = "Fábrica de Cursos - Metalmecânica";
const INPUT_LABEL: &str = "Digite sua pergunta sobre o estudo de mercado:";
const SUBMIT_LABEL: &str = "Enviar";
const BUSY_LABEL: &str = "Gerando resposta...";
const ANSWER_HEADING: &str = "Resposta do GPT:";

enum Outcome<'a> {
    Idle,
    Answer(&'a str),
    Failed(&'a str),
}

fn render(query: &str, outcome: Outcome<'_>) -> String {
    let result = match outcome {
        Outcome::Idle => String::new(),
        Outcome::Answer(answer) => format!(
            "<section><h2>{}</h2><div class=\"answer\">{}</div></section>",
            ANSWER_HEADING,
            clean_text(answer)
        ),
        Outcome::Failed(message) => {
            format!("<section class=\"error\"><p>{}</p></section>", clean_text(message))
        }
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }}
input[type=text] {{ width: 100%; padding: .5rem; box-sizing: border-box; }}
.answer {{ white-space: pre-wrap; }}
.error {{ color: #b00020; }}
</style>
</head>
<body>
<h1>{title}</h1>
<form method="post" action="/" onsubmit="document.getElementById('busy').hidden = false;">
<label for="query">{label}</label>
<input type="text" id="query" name="query" value="{query}">
<button type="submit">{submit}</button>
</form>
<p id="busy" hidden>{busy}</p>
{result}
</body>
</html>
"#,
        title = TITLE,
        label = INPUT_LABEL,
        query = clean_text(query),
        submit = SUBMIT_LABEL,
        busy = BUSY_LABEL,
        result = result,
    )
}

pub fn handle_index() -> impl Reply {
    warp::reply::html(render("", Outcome::Idle))
}

pub async fn handle_ask(form: AskForm, pipeline: RagPipeline) -> Result<impl Reply, Infallible> {
    if form.query.trim().is_empty() {
        return Ok(warp::reply::with_status(
            warp::reply::html(render("", Outcome::Idle)),
            StatusCode::OK,
        ));
    }

    let request_id = Uuid::new_v4();
    let span = info_span!("ask", %request_id);

    async move {
        info!("Processing form question: {}", form.query);

        let reply = match pipeline.ask(&form.query).await {
            Ok(answer) => warp::reply::with_status(
                warp::reply::html(render(&form.query, Outcome::Answer(&answer))),
                StatusCode::OK,
            ),
            Err(e) => warp::reply::with_status(
                warp::reply::html(render(&form.query, Outcome::Failed(&e.to_string()))),
                e.status_code(),
            ),
        };

        Ok(reply)
    }
    .instrument(span)
    .await
}
