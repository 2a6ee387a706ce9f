use crate::models::{AnalyticsDocument, ProjectRecord};

pub fn render_index(projects: &[ProjectRecord], analytics: &AnalyticsDocument) -> String {
    let cards = if projects.is_empty() {
        "<p class=\"empty\">No projects published yet.</p>".to_string()
    } else {
        projects.iter().map(render_card).collect()
    };

    INDEX_HTML
        .replace("{{CARDS}}", &cards)
        .replace("{{PROJECT_COUNT}}", &projects.len().to_string())
        .replace("{{VISITOR_TOTAL}}", &analytics.visitors.total.to_string())
}

fn render_card(project: &ProjectRecord) -> String {
    let title = escape(&project.title);
    let image = project
        .images
        .first()
        .map(String::as_str)
        .unwrap_or(&project.img_src);

    let tags: String = project
        .tags
        .iter()
        .map(|tag| format!("<span class=\"tag\">{}</span>", escape(tag)))
        .collect();

    let link = match &project.project_link {
        Some(url) => format!(
            "<a class=\"visit\" href=\"{}\" rel=\"noopener\" target=\"_blank\">Visit</a>",
            escape(url)
        ),
        None => String::new(),
    };

    format!(
        r#"<article class="card">
  <div class="thumb"><img src="{image}" alt="{title}" loading="lazy" /></div>
  <div class="card-body">
    <h3>{title}</h3>
    <div class="tags">{tags}</div>
    {link}
  </div>
</article>
"#,
        image = escape(image),
    )
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Portfolio</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&display=swap');

    :root {
      --bg: #0f1115;
      --panel: #171a21;
      --ink: #e8e6e1;
      --muted: #8b8fa3;
      --accent: #ff6b4a;
      --shadow: 0 18px 48px rgba(0, 0, 0, 0.45);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      padding: 48px 24px 64px;
    }

    .wrap {
      width: min(1040px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 36px;
    }

    header h1 {
      margin: 0;
      font-size: clamp(2rem, 4vw, 2.6rem);
      font-weight: 600;
    }

    header p {
      margin: 6px 0 0;
      color: var(--muted);
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(auto-fill, minmax(280px, 1fr));
      gap: 24px;
    }

    .card {
      background: var(--panel);
      border-radius: 16px;
      overflow: hidden;
      box-shadow: var(--shadow);
      display: flex;
      flex-direction: column;
    }

    .thumb {
      aspect-ratio: 16 / 10;
      background: #20242e;
    }

    .thumb img {
      width: 100%;
      height: 100%;
      object-fit: cover;
      display: block;
    }

    .card-body {
      padding: 18px 20px 22px;
      display: grid;
      gap: 12px;
    }

    .card-body h3 {
      margin: 0;
      font-size: 1.15rem;
    }

    .tags {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
    }

    .tag {
      font-size: 0.75rem;
      color: var(--muted);
      border: 1px solid #2a2f3a;
      border-radius: 999px;
      padding: 3px 10px;
    }

    .visit {
      justify-self: start;
      color: var(--accent);
      text-decoration: none;
      font-weight: 500;
    }

    .visit:hover {
      text-decoration: underline;
    }

    .empty {
      color: var(--muted);
    }

    footer {
      color: var(--muted);
      font-size: 0.85rem;
      display: flex;
      gap: 18px;
    }
  </style>
</head>
<body>
  <div class="wrap">
    <header>
      <h1>Selected Work</h1>
      <p>{{PROJECT_COUNT}} projects</p>
    </header>
    <section class="grid">
{{CARDS}}
    </section>
    <footer>
      <span>{{VISITOR_TOTAL}} visitors</span>
    </footer>
  </div>
</body>
</html>
"#;
