use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use crate::app::{
    App, Focus, InputMode, TextField, Tool, WebsiteView, ASPECT_RATIOS, LANGUAGES,
};
use crate::decode::{confidence_percent, ChartDataset, UiComponent};

/// Parse a line of text and convert **bold** markdown plus `# headings` and
/// list bullets to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    if let Some(heading) = text.strip_prefix('#') {
        let heading = heading.trim_start_matches('#').trim_start();
        return Line::from(Span::styled(
            heading.to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    }

    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.char_indices().peekable();
    let mut current_text = String::new();

    while let Some((_, c)) = chars.next() {
        if c == '*' {
            // Check for ** (bold)
            if chars.peek().map(|(_, c)| *c) == Some('*') {
                chars.next();

                if !current_text.is_empty() {
                    spans.push(Span::raw(std::mem::take(&mut current_text)));
                }

                // Find closing **
                let mut bold_text = String::new();
                let mut found_close = false;

                while let Some((_, c)) = chars.next() {
                    if c == '*' && chars.peek().map(|(_, c)| *c) == Some('*') {
                        chars.next();
                        found_close = true;
                        break;
                    }
                    bold_text.push(c);
                }

                if found_close && !bold_text.is_empty() {
                    spans.push(Span::styled(
                        bold_text,
                        Style::default().add_modifier(Modifier::BOLD),
                    ));
                } else {
                    // No closing **, treat as literal
                    current_text.push_str("**");
                    current_text.push_str(&bold_text);
                }
            } else {
                current_text.push(c);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

/// Markdown-ish block rendering: headings, bold, and dimmed code fences.
fn markdown_lines(content: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut in_fence = false;
    for line in content.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            lines.push(Line::from(Span::styled(
                line.to_string(),
                Style::default().fg(Color::DarkGray),
            )));
        } else if in_fence {
            lines.push(Line::from(Span::styled(
                line.to_string(),
                Style::default().fg(Color::Green),
            )));
        } else {
            lines.push(parse_markdown_line(line));
        }
    }
    lines
}

fn border_color(focused: bool) -> Color {
    if focused {
        Color::Cyan
    } else {
        Color::DarkGray
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let [sidebar_area, panel_area] =
        Layout::horizontal([Constraint::Length(26), Constraint::Min(0)]).areas(body_area);

    render_sidebar(app, frame, sidebar_area);

    match app.active_tool {
        Tool::Image => render_image(app, frame, panel_area),
        Tool::Recipe => render_recipe(app, frame, panel_area),
        Tool::Voice => render_voice(app, frame, panel_area),
        Tool::Chat => render_chat(app, frame, panel_area),
        Tool::Website => render_website(app, frame, panel_area),
        Tool::MobileUi => render_mobile(app, frame, panel_area),
        Tool::Chart => render_chart(app, frame, panel_area),
        Tool::ContentChecker => render_content(app, frame, panel_area),
        Tool::CodeExplainer => render_code(app, frame, panel_area),
        Tool::LanguageDetector => render_detect(app, frame, panel_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" AI Toolbox ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("· {} ", app.active_tool.title()),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let hints = if app.input_mode == InputMode::Editing {
        match app.active_tool {
            Tool::Chat => "Enter send · Esc done · Tab next field",
            _ => "Enter run · Esc done · Tab next field",
        }
    } else {
        match app.focus {
            Focus::Sidebar => "j/k navigate · Enter open · q quit",
            Focus::Panel => match app.active_tool {
                Tool::Voice => "Tab field · i edit · Enter/Space play/stop · Esc back",
                Tool::ContentChecker => "i edit · a analyze · H humanize · j/k scroll · Esc back",
                Tool::Website => "i edit · Enter run · t preview/code · j/k scroll · Esc back",
                Tool::Chat => "Enter type · r new chat · j/k scroll · Esc back",
                Tool::Image | Tool::CodeExplainer => {
                    "Tab field · i edit · \u{2190}/\u{2192} change · Enter run · Esc back"
                }
                _ => "Tab field · i edit · Enter run · j/k scroll · Esc back",
            },
        }
    };
    frame.render_widget(
        Paragraph::new(Span::styled(
            format!(" {hints}"),
            Style::default().fg(Color::DarkGray),
        )),
        area,
    );
}

fn render_sidebar(app: &mut App, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = Tool::ALL
        .iter()
        .map(|tool| {
            let marker = if *tool == app.active_tool { "● " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Cyan)),
                Span::raw(tool.title()),
            ]))
        })
        .collect();

    let focused = app.focus == Focus::Sidebar;
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color(focused)))
                .title(" Tools "),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_stateful_widget(list, area, &mut app.sidebar_state);
}

/// Bordered single-value text input. Places the terminal cursor inside the
/// block while the field is being edited.
fn render_input(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    field: &TextField,
    focused: bool,
    editing: bool,
) {
    let style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(border_color(focused))
    };

    let paragraph = Paragraph::new(field.value.as_str())
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(style)
                .title(format!(" {title} ")),
        );
    frame.render_widget(paragraph, area);

    if editing {
        let inner_width = area.width.saturating_sub(2).max(1) as usize;
        let row = field.cursor / inner_width;
        let col = field.cursor % inner_width;
        let max_row = area.height.saturating_sub(3) as usize;
        let row = row.min(max_row);
        frame.set_cursor(area.x + 1 + col as u16, area.y + 1 + row as u16);
    }
}

/// `< value >` selector rendered as a one-line block.
fn render_selector(frame: &mut Frame, area: Rect, title: &str, value: &str, focused: bool) {
    let paragraph = Paragraph::new(Line::from(vec![
        Span::styled("\u{2039} ", Style::default().fg(Color::DarkGray)),
        Span::styled(value.to_string(), Style::default().bold()),
        Span::styled(" \u{203a}", Style::default().fg(Color::DarkGray)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color(focused)))
            .title(format!(" {title} ")),
    );
    frame.render_widget(paragraph, area);
}

fn loading_line(app: &App, label: &str) -> Line<'static> {
    let dots = ".".repeat((app.animation_frame as usize) + 1);
    Line::from(Span::styled(
        format!("{label}{dots}"),
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    ))
}

fn error_line(message: &str) -> Line<'static> {
    Line::from(Span::styled(
        message.to_string(),
        Style::default().fg(Color::Red),
    ))
}

fn tagline(tool: Tool) -> Line<'static> {
    Line::from(Span::styled(
        tool.tagline().to_string(),
        Style::default().fg(Color::Gray),
    ))
}

fn result_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {title} "))
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

fn render_image(app: &mut App, frame: &mut Frame, area: Rect) {
    let [tag_area, prompt_area, settings_area, result_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    frame.render_widget(Paragraph::new(tagline(Tool::Image)), tag_area);

    let panel_focused = app.focus == Focus::Panel;
    let editing = app.input_mode == InputMode::Editing;
    render_input(
        frame,
        prompt_area,
        "Prompt",
        &app.image.prompt,
        panel_focused && app.image.field == 0,
        editing && app.image.field == 0,
    );

    let [count_area, aspect_area] =
        Layout::horizontal([Constraint::Length(20), Constraint::Length(20)]).areas(settings_area);
    render_selector(
        frame,
        count_area,
        "Images",
        &app.image.count.to_string(),
        panel_focused && app.image.field == 1,
    );
    render_selector(
        frame,
        aspect_area,
        "Aspect Ratio",
        ASPECT_RATIOS[app.image.aspect_index],
        panel_focused && app.image.field == 2,
    );

    let mut lines: Vec<Line> = Vec::new();
    if app.image.task.is_loading() {
        lines.push(loading_line(app, "Generating images"));
    } else if let Some(message) = app.image.task.error() {
        lines.push(error_line(message));
    } else if let Some(images) = app.image.task.result() {
        for (i, image) in images.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("Image {} ", i + 1),
                    Style::default().fg(Color::Cyan).bold(),
                ),
                Span::styled(
                    format!("· {} · ~{} KiB", image.mime_type, image.approx_bytes() / 1024),
                    Style::default().fg(Color::Gray),
                ),
            ]));
            let preview: String = image.data_uri.chars().take(64).collect();
            lines.push(Line::from(Span::styled(
                format!("{preview}\u{2026}"),
                Style::default().fg(Color::DarkGray),
            )));
            lines.push(Line::default());
        }
    }

    let result = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: false })
        .block(result_block("Result"));
    frame.render_widget(result, result_area);
}

fn render_recipe(app: &mut App, frame: &mut Frame, area: Rect) {
    let [tag_area, ingredients_area, diet_area, result_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    frame.render_widget(Paragraph::new(tagline(Tool::Recipe)), tag_area);

    let panel_focused = app.focus == Focus::Panel;
    let editing = app.input_mode == InputMode::Editing;
    render_input(
        frame,
        ingredients_area,
        "Ingredients",
        &app.recipe.ingredients,
        panel_focused && app.recipe.field == 0,
        editing && app.recipe.field == 0,
    );
    render_input(
        frame,
        diet_area,
        "Dietary Restrictions (optional)",
        &app.recipe.diet,
        panel_focused && app.recipe.field == 1,
        editing && app.recipe.field == 1,
    );

    let text = if app.recipe.task.is_loading() {
        Text::from(loading_line(app, "Cooking up a recipe"))
    } else if let Some(message) = app.recipe.task.error() {
        Text::from(error_line(message))
    } else if let Some(recipe) = app.recipe.task.result() {
        Text::from(markdown_lines(recipe))
    } else {
        Text::from(Span::styled(
            "Your recipe will appear here.",
            Style::default().fg(Color::DarkGray),
        ))
    };

    let result = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .scroll((app.recipe.scroll, 0))
        .block(result_block("Recipe"));
    frame.render_widget(result, result_area);
}

fn render_voice(app: &mut App, frame: &mut Frame, area: Rect) {
    let [tag_area, text_area, status_area, voices_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(5),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(area);

    frame.render_widget(Paragraph::new(tagline(Tool::Voice)), tag_area);

    let panel_focused = app.focus == Focus::Panel;
    let editing = app.input_mode == InputMode::Editing;
    render_input(
        frame,
        text_area,
        "Text",
        &app.voice.text,
        panel_focused && app.voice.field == 0,
        editing && app.voice.field == 0,
    );

    let status = if app.voice.speaking {
        Line::from(Span::styled(
            "Speaking\u{2026} (Enter/Space to stop)",
            Style::default().fg(Color::Green),
        ))
    } else if let Some(message) = &app.voice.error {
        error_line(message)
    } else {
        Line::from(Span::styled(
            "Enter/Space to generate & play",
            Style::default().fg(Color::DarkGray),
        ))
    };
    frame.render_widget(Paragraph::new(status), status_area);

    let list_focused = panel_focused && app.voice.field == 1;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(list_focused)))
        .title(" Voice ");

    if app.voice.voices.is_loading() {
        frame.render_widget(
            Paragraph::new(loading_line(app, "Loading voices")).block(block),
            voices_area,
        );
    } else if let Some(message) = app.voice.voices.error() {
        frame.render_widget(Paragraph::new(error_line(message)).block(block), voices_area);
    } else if let Some(voices) = app.voice.voices.result() {
        if voices.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "No voices found.",
                    Style::default().fg(Color::DarkGray),
                ))
                .block(block),
                voices_area,
            );
        } else {
            let items: Vec<ListItem> = voices
                .iter()
                .map(|voice| ListItem::new(voice.label()))
                .collect();
            let list = List::new(items).block(block).highlight_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );
            frame.render_stateful_widget(list, voices_area, &mut app.voice.voice_state);
        }
    } else {
        frame.render_widget(block, voices_area);
    }
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    use crate::gemini::Role;

    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    let mut lines: Vec<Line> = Vec::new();
    for turn in &app.chat.session.turns {
        match turn.role {
            Role::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                for line in turn.text.lines() {
                    lines.push(Line::from(line.to_string()));
                }
                lines.push(Line::default());
            }
            Role::Model => {
                lines.push(Line::from(Span::styled(
                    "AI:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                if turn.text.is_empty() && app.chat.streaming {
                    lines.push(loading_line(app, "Thinking"));
                } else {
                    for line in turn.text.lines() {
                        lines.push(parse_markdown_line(line));
                    }
                }
                lines.push(Line::default());
            }
        }
    }
    if let Some(message) = &app.chat.error {
        lines.push(error_line(message));
    }

    // Pin the view to the bottom while a reply is streaming in
    let inner_height = chat_area.height.saturating_sub(2);
    let inner_width = chat_area.width.saturating_sub(2).max(1) as usize;
    if app.chat.streaming {
        let mut total: u16 = 0;
        for line in &lines {
            let chars: usize = line.spans.iter().map(|span| span.content.chars().count()).sum();
            total = total.saturating_add(((chars / inner_width) + 1) as u16);
        }
        app.chat.scroll = total.saturating_sub(inner_height);
    }

    let chat = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: false })
        .scroll((app.chat.scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color(app.focus == Focus::Panel)))
                .title(" Conversation "),
        );
    frame.render_widget(chat, chat_area);

    render_input(
        frame,
        input_area,
        "Message",
        &app.chat.input,
        app.focus == Focus::Panel,
        app.input_mode == InputMode::Editing,
    );
}

fn render_website(app: &mut App, frame: &mut Frame, area: Rect) {
    let [tag_area, prompt_area, result_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    frame.render_widget(Paragraph::new(tagline(Tool::Website)), tag_area);

    render_input(
        frame,
        prompt_area,
        "Describe your website",
        &app.website.prompt,
        app.focus == Focus::Panel,
        app.input_mode == InputMode::Editing,
    );

    let (title, text) = if app.website.task.is_loading() {
        (
            " Result ".to_string(),
            Text::from(loading_line(
                app,
                "Constructing your website... this may take a moment",
            )),
        )
    } else if let Some(message) = app.website.task.error() {
        (" Result ".to_string(), Text::from(error_line(message)))
    } else if let Some(site) = app.website.task.result() {
        match app.website.view {
            WebsiteView::Preview => (
                " Preview (t: code) ".to_string(),
                Text::from(
                    site.full_document()
                        .lines()
                        .map(|line| Line::from(line.to_string()))
                        .collect::<Vec<_>>(),
                ),
            ),
            WebsiteView::Code => {
                let mut lines: Vec<Line> = Vec::new();
                for (name, fragment) in [("HTML", &site.html), ("CSS", &site.css), ("JavaScript", &site.js)]
                {
                    lines.push(Line::from(Span::styled(
                        name,
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                    for line in fragment.lines() {
                        lines.push(Line::from(Span::styled(
                            line.to_string(),
                            Style::default().fg(Color::Green),
                        )));
                    }
                    lines.push(Line::default());
                }
                (" Code (t: preview) ".to_string(), Text::from(lines))
            }
        }
    } else {
        (
            " Result ".to_string(),
            Text::from(Span::styled(
                "The generated page will appear here.",
                Style::default().fg(Color::DarkGray),
            )),
        )
    };

    let result = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .scroll((app.website.scroll, 0))
        .block(result_block(title.trim()));
    frame.render_widget(result, result_area);
}

fn push_component_lines(lines: &mut Vec<Line<'static>>, component: &UiComponent, depth: usize) {
    let indent = "  ".repeat(depth);
    let detail = match component.kind.as_str() {
        "header" => component.property("title"),
        "text" => component.property("content"),
        "image" => component.property("alt").or_else(|| component.property("src")),
        "button" => component.property("label"),
        "input" => component.property("placeholder"),
        _ => None,
    };

    let mut spans = vec![
        Span::raw(indent),
        Span::styled(
            component.kind.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
    ];
    if let Some(detail) = detail {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("\u{201c}{detail}\u{201d}"),
            Style::default().fg(Color::Gray),
        ));
    }
    lines.push(Line::from(spans));

    for child in &component.children {
        push_component_lines(lines, child, depth + 1);
    }
}

fn render_mobile(app: &mut App, frame: &mut Frame, area: Rect) {
    let [tag_area, prompt_area, result_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    frame.render_widget(Paragraph::new(tagline(Tool::MobileUi)), tag_area);

    render_input(
        frame,
        prompt_area,
        "Describe your screen",
        &app.mobile.prompt,
        app.focus == Focus::Panel,
        app.input_mode == InputMode::Editing,
    );

    let text = if app.mobile.task.is_loading() {
        Text::from(loading_line(app, "Laying out your screen"))
    } else if let Some(message) = app.mobile.task.error() {
        Text::from(error_line(message))
    } else if let Some(spec) = app.mobile.task.result() {
        let mut lines = Vec::new();
        for component in &spec.components {
            push_component_lines(&mut lines, component, 0);
        }
        Text::from(lines)
    } else {
        Text::from(Span::styled(
            "The component layout will appear here.",
            Style::default().fg(Color::DarkGray),
        ))
    };

    let result = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .scroll((app.mobile.scroll, 0))
        .block(result_block("Screen Layout"));
    frame.render_widget(result, result_area);
}

/// First `#rrggbb` color in a Chart.js styling value (a single string or an
/// array of strings).
fn hex_color(value: &serde_json::Value) -> Option<Color> {
    let hex = match value {
        serde_json::Value::String(s) => s.as_str(),
        serde_json::Value::Array(items) => items.first()?.as_str()?,
        _ => return None,
    };
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

/// Horizontal value bars, one row per label. The bar is scaled against the
/// largest value in the dataset and tinted with the dataset's first
/// backgroundColor when one was returned.
fn dataset_lines(labels: &[String], dataset: &ChartDataset, width: usize) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        dataset.label.clone(),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))];

    let bar_color = dataset
        .background_color
        .as_ref()
        .and_then(hex_color)
        .unwrap_or(Color::Cyan);
    let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let max_value = dataset.data.iter().cloned().fold(0.0_f64, f64::max);
    let bar_width = width.saturating_sub(label_width + 14).max(8);

    for (label, value) in labels.iter().zip(&dataset.data) {
        let filled = if max_value > 0.0 {
            ((value / max_value) * bar_width as f64).round() as usize
        } else {
            0
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{label:label_width$}  "),
                Style::default().fg(Color::Gray),
            ),
            Span::styled("\u{2587}".repeat(filled), Style::default().fg(bar_color)),
            Span::styled(format!(" {value}"), Style::default().fg(Color::Gray)),
        ]));
    }

    lines.push(Line::default());
    lines
}

fn render_chart(app: &mut App, frame: &mut Frame, area: Rect) {
    let [tag_area, prompt_area, result_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    frame.render_widget(Paragraph::new(tagline(Tool::Chart)), tag_area);

    render_input(
        frame,
        prompt_area,
        "Describe your data",
        &app.chart.prompt,
        app.focus == Focus::Panel,
        app.input_mode == InputMode::Editing,
    );

    let inner_width = result_area.width.saturating_sub(2).max(1) as usize;
    let text = if app.chart.task.is_loading() {
        Text::from(loading_line(app, "Generating chart"))
    } else if let Some(message) = app.chart.task.error() {
        Text::from(error_line(message))
    } else if let Some(chart) = app.chart.task.result() {
        let mut lines = vec![
            Line::from(Span::styled(
                format!("{} chart", chart.kind),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::default(),
        ];
        for dataset in &chart.data.datasets {
            lines.extend(dataset_lines(&chart.data.labels, dataset, inner_width));
        }
        Text::from(lines)
    } else {
        Text::from(Span::styled(
            "The chart will appear here.",
            Style::default().fg(Color::DarkGray),
        ))
    };

    let result = Paragraph::new(text)
        .scroll((app.chart.scroll, 0))
        .block(result_block("Chart"));
    frame.render_widget(result, result_area);
}

fn classification_color(classification: &str) -> Color {
    match classification {
        "Likely AI-generated" => Color::Red,
        "Likely Human-written" => Color::Green,
        _ => Color::Yellow,
    }
}

fn render_content(app: &mut App, frame: &mut Frame, area: Rect) {
    let [tag_area, text_area, result_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(5),
        Constraint::Min(0),
    ])
    .areas(area);

    frame.render_widget(Paragraph::new(tagline(Tool::ContentChecker)), tag_area);

    render_input(
        frame,
        text_area,
        "Text to analyze",
        &app.content.text,
        app.focus == Focus::Panel,
        app.input_mode == InputMode::Editing,
    );

    let mut lines: Vec<Line> = Vec::new();

    if app.content.analysis.is_loading() {
        lines.push(loading_line(app, "Analyzing"));
    } else if let Some(message) = app.content.analysis.error() {
        lines.push(error_line(message));
    } else if let Some(analysis) = app.content.analysis.result() {
        lines.push(Line::from(vec![
            Span::styled(
                analysis.classification.clone(),
                Style::default()
                    .fg(classification_color(&analysis.classification))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({} confidence)", confidence_percent(analysis.confidence)),
                Style::default().fg(Color::Gray),
            ),
        ]));
        lines.push(Line::default());
        for line in analysis.reasoning.lines() {
            lines.push(Line::from(line.to_string()));
        }
    } else {
        lines.push(Line::from(Span::styled(
            "Press 'a' to analyze the text.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Humanized version",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )));
    if app.content.humanized.is_loading() {
        lines.push(loading_line(app, "Rewriting"));
    } else if let Some(message) = app.content.humanized.error() {
        lines.push(error_line(message));
    } else if let Some(humanized) = app.content.humanized.result() {
        for line in humanized.lines() {
            lines.push(Line::from(Span::styled(
                line.to_string(),
                Style::default().fg(Color::Green),
            )));
        }
    } else {
        lines.push(Line::from(Span::styled(
            "Press 'H' to rewrite the text in a more natural voice.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let result = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: false })
        .scroll((app.content.scroll, 0))
        .block(result_block("Analysis"));
    frame.render_widget(result, result_area);
}

fn render_code(app: &mut App, frame: &mut Frame, area: Rect) {
    let [tag_area, code_area, language_area, result_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(5),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    frame.render_widget(Paragraph::new(tagline(Tool::CodeExplainer)), tag_area);

    let panel_focused = app.focus == Focus::Panel;
    let editing = app.input_mode == InputMode::Editing;
    render_input(
        frame,
        code_area,
        "Code",
        &app.code.code,
        panel_focused && app.code.field == 0,
        editing && app.code.field == 0,
    );

    let [language_area] = Layout::horizontal([Constraint::Length(24)]).areas(language_area);
    render_selector(
        frame,
        language_area,
        "Language",
        LANGUAGES[app.code.language_index].1,
        panel_focused && app.code.field == 1,
    );

    let text = if app.code.task.is_loading() {
        Text::from(loading_line(app, "Explaining"))
    } else if let Some(message) = app.code.task.error() {
        Text::from(error_line(message))
    } else if let Some(explanation) = app.code.task.result() {
        Text::from(markdown_lines(explanation))
    } else {
        Text::from(Span::styled(
            "The explanation will appear here.",
            Style::default().fg(Color::DarkGray),
        ))
    };

    let result = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .scroll((app.code.scroll, 0))
        .block(result_block("Explanation"));
    frame.render_widget(result, result_area);
}

fn render_detect(app: &mut App, frame: &mut Frame, area: Rect) {
    let [tag_area, code_area, result_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(5),
        Constraint::Min(0),
    ])
    .areas(area);

    frame.render_widget(Paragraph::new(tagline(Tool::LanguageDetector)), tag_area);

    render_input(
        frame,
        code_area,
        "Code",
        &app.detect.code,
        app.focus == Focus::Panel,
        app.input_mode == InputMode::Editing,
    );

    let text = if app.detect.task.is_loading() {
        Text::from(loading_line(app, "Detecting"))
    } else if let Some(message) = app.detect.task.error() {
        Text::from(error_line(message))
    } else if let Some(detection) = app.detect.task.result() {
        Text::from(vec![
            Line::from(Span::styled(
                detection.language.clone(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("Confidence: {}", confidence_percent(detection.confidence)),
                Style::default().fg(Color::Gray),
            )),
        ])
    } else {
        Text::from(Span::styled(
            "The detected language will appear here.",
            Style::default().fg(Color::DarkGray),
        ))
    };

    let result = Paragraph::new(text).block(result_block("Detection"));
    frame.render_widget(result, result_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|span| span.content.to_string()).collect()
    }

    #[test]
    fn test_parse_markdown_bold() {
        let line = parse_markdown_line("a **bold** word");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "bold");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_parse_markdown_unclosed_bold_is_literal() {
        let line = parse_markdown_line("a **dangling");
        assert_eq!(line_text(&line), "a **dangling");
    }

    #[test]
    fn test_parse_markdown_heading() {
        let line = parse_markdown_line("## Fried Rice");
        assert_eq!(line_text(&line), "Fried Rice");
        assert!(line.spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_markdown_lines_toggle_code_fence() {
        let lines = markdown_lines("intro\n```\nlet x = 1;\n```\noutro");
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[2].spans[0].style.fg, Some(Color::Green));
    }

    #[test]
    fn test_dataset_lines_scale_to_max() {
        let dataset = ChartDataset {
            label: "counts".to_string(),
            data: vec![10.0, 5.0],
            background_color: None,
            border_color: None,
            border_width: None,
        };
        let labels = vec!["a".to_string(), "b".to_string()];
        // Width 39 leaves an even 24-cell bar area, so the half bar is exact
        let lines = dataset_lines(&labels, &dataset, 39);
        // Header, two bars, trailing blank
        assert_eq!(lines.len(), 4);
        let full = line_text(&lines[1]);
        let half = line_text(&lines[2]);
        let bar_len = |s: &str| s.chars().filter(|c| *c == '\u{2587}').count();
        assert_eq!(bar_len(&full), 2 * bar_len(&half));
    }

    #[test]
    fn test_dataset_lines_zip_stops_at_shorter_side() {
        let dataset = ChartDataset {
            label: "counts".to_string(),
            data: vec![1.0],
            background_color: None,
            border_color: None,
            border_width: None,
        };
        let labels = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let lines = dataset_lines(&labels, &dataset, 40);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_hex_color_accepts_string_or_array() {
        use serde_json::json;
        assert_eq!(hex_color(&json!("#ff0000")), Some(Color::Rgb(255, 0, 0)));
        assert_eq!(hex_color(&json!(["#00ff00", "#0000ff"])), Some(Color::Rgb(0, 255, 0)));
        assert_eq!(hex_color(&json!("red")), None);
        assert_eq!(hex_color(&json!(12)), None);
        assert_eq!(hex_color(&json!("#fff")), None);
    }

    #[test]
    fn test_classification_colors() {
        assert_eq!(classification_color("Likely AI-generated"), Color::Red);
        assert_eq!(classification_color("Likely Human-written"), Color::Green);
        assert_eq!(classification_color("Uncertain"), Color::Yellow);
    }
}
