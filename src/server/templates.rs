//! Embedded HTML templates for the browser-facing pages.

/// Landing page with the submission form.
pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Submission Checker</title>
</head>
<body>
  <h1>Submission Checker</h1>
  <form action="/validate" method="post">
    <label for="task_name">Task name</label>
    <input type="text" id="task_name" name="task_name" placeholder="0-bank" required>
    <label for="repo_url">Repository URL</label>
    <input type="text" id="repo_url" name="repo_url" placeholder="https://github.com/user/repo.git" required>
    <button type="submit">Check</button>
  </form>
</body>
</html>
"#;

/// Result page rendered for form submissions.
///
/// Tera template; rendered with autoescape so raw checker output cannot
/// inject markup.
pub const RESPONSE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Check result: {{ task_name }}</title>
</head>
<body>
  <h1>Check result</h1>
  <p>Task: <strong>{{ task_name }}</strong></p>
  <p>Repository: <strong>{{ repo_url }}</strong></p>
  <p>Exit code: <strong>{{ exit_code }}</strong></p>
  <h2>Output</h2>
  <pre>{{ stdout }}</pre>
  <h2>Diagnostics</h2>
  <pre>{{ stderr }}</pre>
  <p><a href="/">Check another submission</a></p>
</body>
</html>
"#;
