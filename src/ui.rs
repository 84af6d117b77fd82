use chrono::Utc;
use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, Clear, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::{App, DetailFocus, View};
use crate::constants::constants;
use crate::forms::Form;
use crate::interact::displayed_count;
use crate::model::VideoItem;
use crate::studio::{self, ModalState};
use crate::theme::Theme;
use crate::timefmt;

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
  let x = area.x + area.width.saturating_sub(width) / 2;
  let y = area.y + area.height.saturating_sub(height) / 2;
  Rect { x, y, width: width.min(area.width), height: height.min(area.height) }
}

fn views_label(item: &VideoItem) -> String {
  item.views.map(|v| format!("{} views", v)).unwrap_or_else(|| constants().fallback_views.clone())
}

fn channel_label(item: &VideoItem) -> String {
  item
    .channel_name
    .clone()
    .filter(|s| !s.is_empty())
    .unwrap_or_else(|| constants().fallback_channel_name.clone())
}

fn uploaded_label(item: &VideoItem) -> Option<String> {
  item.uploaded_at.map(|t| timefmt::format_time_ago(t, Utc::now()))
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, main_area, status_area, footer_area] =
    Layout::vertical([Constraint::Length(1), Constraint::Min(3), Constraint::Length(1), Constraint::Length(1)])
      .areas(frame.area());

  render_header(frame, app, header_area);
  match app.view {
    View::Browse => render_browse(frame, app, main_area),
    View::Detail => render_detail(frame, app, main_area),
    View::Channel => render_channel(frame, app, main_area),
    View::Login | View::Register | View::CreateChannel => render_auth(frame, app, main_area),
  }
  render_status(frame, app, status_area);
  render_footer(frame, app, footer_area);

  if app.alert.is_some() {
    render_alert(frame, app, frame.area());
  }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let left = Line::from(Span::styled(" ▶ tubular ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)));
  frame.render_widget(left, area);

  let right_text = match app.session {
    Some(ref s) => format!("{}  v{} ", s.username, env!("CARGO_PKG_VERSION")),
    None => format!("signed out  v{} ", env!("CARGO_PKG_VERSION")),
  };
  let right = Line::from(Span::styled(&right_text, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(right_text.len() as u16), width: right_text.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

// --- Browse view ---

fn render_browse(frame: &mut Frame, app: &mut App, area: Rect) {
  let [search_area, cat_area, list_area] =
    Layout::vertical([Constraint::Length(3), Constraint::Length(1), Constraint::Min(3)]).areas(area);

  render_search_input(frame, app, search_area);
  render_category_bar(frame, app, cat_area);
  render_video_list(frame, app, list_area);
}

fn render_search_input(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let border_color = if app.search_focused { theme.accent } else { theme.border };
  let input_block = Block::bordered()
    .title(" Search ")
    .title_style(Style::default().fg(border_color))
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(border_color))
    .padding(Padding::horizontal(1));

  let inner_w = area.width.saturating_sub(4) as usize;
  let cursor_col = display_width(&app.search, app.search_cursor);

  if cursor_col < app.search_scroll {
    app.search_scroll = cursor_col;
  } else if cursor_col >= app.search_scroll + inner_w {
    app.search_scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let visible: String = app
    .search
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= app.search_scroll)
    .take_while(|(start, _, _)| *start < app.search_scroll + inner_w)
    .map(|(_, _, c)| c)
    .collect();

  let paragraph = Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(input_block);
  frame.render_widget(paragraph, area);

  if app.search_focused {
    let cursor_x = area.x + 2 + (cursor_col - app.search_scroll) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
  }
}

fn render_category_bar(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let mut spans = vec![Span::raw(" ")];
  for cat in app.categories() {
    let style = if cat == app.selected_category {
      Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(theme.muted)
    };
    spans.push(Span::styled(format!(" {} ", cat), style));
    spans.push(Span::raw(" "));
  }
  frame.render_widget(Line::from(spans), area);
}

fn render_video_list(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let block = Block::bordered()
    .title(" Videos ")
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(theme.border));

  if app.catalog.is_loading() {
    let paragraph = Paragraph::new("Loading videos…").style(Style::default().fg(theme.muted)).block(block);
    frame.render_widget(paragraph, area);
    return;
  }
  if let Some(err) = app.catalog.error() {
    let paragraph = Paragraph::new(err.to_string())
      .style(Style::default().fg(theme.error))
      .wrap(Wrap { trim: true })
      .block(block);
    frame.render_widget(paragraph, area);
    return;
  }
  if app.visible.is_empty() {
    let msg = format!("No videos found for \"{}\"", app.search);
    let paragraph = Paragraph::new(msg).style(Style::default().fg(theme.muted)).block(block);
    frame.render_widget(paragraph, area);
    return;
  }

  // Inner width: area minus 2 borders minus 2 chars for highlight symbol ("▶ ")
  let inner_w = area.width.saturating_sub(4) as usize;

  let items: Vec<ListItem> = app
    .visible
    .iter()
    .enumerate()
    .filter_map(|(row, &idx)| app.catalog.items().get(idx).map(|item| (row, item)))
    .map(|(row, item)| {
      let is_selected = Some(row) == app.list_state.selected();
      let fg = if is_selected { theme.highlight_fg } else { theme.fg };
      let bg = if is_selected {
        theme.highlight_bg
      } else if row % 2 == 1 {
        theme.stripe_bg
      } else {
        theme.bg
      };

      let duration = app.durations.display(&item.id).to_string();
      let mut meta = format!("{}  {}", channel_label(item), views_label(item));
      if let Some(ago) = uploaded_label(item) {
        meta = format!("{} · {}", meta, ago);
      }

      let right_w = duration.chars().count() + 2 + meta.chars().count();
      let title_max = inner_w.saturating_sub(right_w + 2);
      let title = truncate_str(&item.title, title_max);
      let gap = inner_w.saturating_sub(title.chars().count() + right_w);

      let line = Line::from(vec![
        Span::styled(title, Style::default().fg(fg)),
        Span::raw(" ".repeat(gap)),
        Span::styled(meta, Style::default().fg(theme.muted)),
        Span::raw("  "),
        Span::styled(duration, Style::default().fg(theme.accent)),
      ]);
      ListItem::new(line).bg(bg)
    })
    .collect();

  let list = List::new(items)
    .block(
      Block::bordered()
        .title(format!(" Videos — {} ", app.visible.len()))
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .border_type(ratatui::widgets::BorderType::Rounded)
        .border_style(Style::default().fg(theme.border)),
    )
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.list_state);
}

// --- Detail view ---

fn render_detail(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let catalog = &app.catalog;
  let durations = &app.durations;
  let Some(detail) = app.detail.as_mut() else { return };

  let item = catalog.find(&detail.video_id).cloned();
  let suggested: Vec<(String, String)> = catalog
    .items()
    .iter()
    .filter(|v| v.id != detail.video_id)
    .map(|v| (v.title.clone(), durations.display(&v.id).to_string()))
    .collect();

  let [left, right] = Layout::horizontal([Constraint::Percentage(68), Constraint::Percentage(32)]).areas(area);
  let [info_area, toggle_area, comments_area, input_area] = Layout::vertical([
    Constraint::Length(7),
    Constraint::Length(1),
    Constraint::Min(3),
    Constraint::Length(3),
  ])
  .areas(left);

  // Video info
  let info_block = Block::bordered()
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(theme.border))
    .padding(Padding::horizontal(1));
  match item {
    Some(ref item) => {
      let inner_w = info_area.width.saturating_sub(4) as usize;
      let mut byline = format!("{}  {}", channel_label(item), views_label(item));
      if let Some(ago) = uploaded_label(item) {
        byline = format!("{} · {}", byline, ago);
      }
      let lines = vec![
        Line::from(Span::styled(
          truncate_str(&item.title, inner_w),
          Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(byline, Style::default().fg(theme.muted))),
        Line::from(""),
        Line::from(Span::styled(truncate_str(&item.description, inner_w * 2), Style::default().fg(theme.fg))),
      ];
      frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }).block(info_block), info_area);
    }
    None => {
      let paragraph =
        Paragraph::new("Video not found.").style(Style::default().fg(theme.error)).block(info_block);
      frame.render_widget(paragraph, info_area);
    }
  }

  // Toggle bar: optimistic counts, server value plus the local flag.
  let (likes, dislikes, subs) = item
    .as_ref()
    .map(|i| (i.likes, i.dislikes, i.subscriber_count))
    .unwrap_or((0, 0, 0));
  let t = &detail.interactions;
  let toggle_span = |label: String, on: bool, pending: bool| {
    let mut style = if on {
      Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(theme.muted)
    };
    if pending {
      style = style.add_modifier(Modifier::DIM);
    }
    Span::styled(label, style)
  };
  let toggles = Line::from(vec![
    Span::raw(" "),
    toggle_span(format!("▲ {} Like", displayed_count(likes, &t.like)), t.like.is_on(), t.like.is_pending()),
    Span::raw("   "),
    toggle_span(
      format!("▼ {} Dislike", displayed_count(dislikes, &t.dislike)),
      t.dislike.is_on(),
      t.dislike.is_pending(),
    ),
    Span::raw("   "),
    toggle_span(
      format!("★ {} Subscribe", displayed_count(subs, &t.subscribe)),
      t.subscribe.is_on(),
      t.subscribe.is_pending(),
    ),
  ]);
  frame.render_widget(toggles, toggle_area);

  // Comment thread
  let comments_border = if detail.focus == DetailFocus::Comments { theme.accent } else { theme.border };
  let comments_title = if detail.comments.loaded {
    format!(" Comments ({}) ", detail.comments.len())
  } else {
    " Comments ".to_string()
  };
  let inner_w = comments_area.width.saturating_sub(4) as usize;
  let comment_items: Vec<ListItem> = detail
    .comments
    .comments
    .iter()
    .map(|c| {
      let author = c.username.clone().filter(|s| !s.is_empty()).unwrap_or_else(|| c.user_id.clone());
      let line = Line::from(vec![
        Span::styled(format!("{}: ", author), Style::default().fg(theme.muted)),
        Span::styled(
          truncate_str(&c.comment, inner_w.saturating_sub(author.chars().count() + 2)),
          Style::default().fg(theme.fg),
        ),
      ]);
      ListItem::new(line)
    })
    .collect();
  let comment_list = List::new(comment_items)
    .block(
      Block::bordered()
        .title(comments_title)
        .title_style(Style::default().fg(comments_border))
        .border_type(ratatui::widgets::BorderType::Rounded)
        .border_style(Style::default().fg(comments_border)),
    )
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg));
  frame.render_stateful_widget(comment_list, comments_area, &mut detail.comment_list);

  // Comment input
  let input_border = if detail.focus == DetailFocus::Input { theme.accent } else { theme.border };
  let field = detail.comment_form.focused_field();
  let input_block = Block::bordered()
    .title(format!(" {} ", field.label))
    .title_style(Style::default().fg(input_border))
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(input_border))
    .padding(Padding::horizontal(1));
  let paragraph = Paragraph::new(field.value.as_str()).style(Style::default().fg(theme.fg)).block(input_block);
  frame.render_widget(paragraph, input_area);
  if detail.focus == DetailFocus::Input {
    let cursor_col = display_width(&field.value, field.cursor);
    let max_col = input_area.width.saturating_sub(4) as usize;
    let cursor_x = input_area.x + 2 + cursor_col.min(max_col) as u16;
    frame.set_cursor_position((cursor_x, input_area.y + 1));
  }

  // Suggested rail
  let rail_border = if detail.focus == DetailFocus::Suggested { theme.accent } else { theme.border };
  let rail_w = right.width.saturating_sub(4) as usize;
  let rail_items: Vec<ListItem> = suggested
    .iter()
    .map(|(title, duration)| {
      let dur_w = duration.chars().count();
      let title = truncate_str(title, rail_w.saturating_sub(dur_w + 2));
      let gap = rail_w.saturating_sub(title.chars().count() + dur_w);
      ListItem::new(Line::from(vec![
        Span::styled(title, Style::default().fg(theme.fg)),
        Span::raw(" ".repeat(gap)),
        Span::styled(duration.clone(), Style::default().fg(theme.muted)),
      ]))
    })
    .collect();
  let rail = List::new(rail_items)
    .block(
      Block::bordered()
        .title(" Up next ")
        .title_style(Style::default().fg(rail_border))
        .border_type(ratatui::widgets::BorderType::Rounded)
        .border_style(Style::default().fg(rail_border)),
    )
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg));
  frame.render_stateful_widget(rail, right, &mut detail.list_state);
}

// --- Channel view ---

fn render_channel(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let catalog = &app.catalog;
  let durations = &app.durations;
  let Some(state) = app.channel_view.as_mut() else { return };

  let [info_area, list_area] = Layout::vertical([Constraint::Length(5), Constraint::Min(3)]).areas(area);

  let info_block = Block::bordered()
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(theme.border))
    .padding(Padding::horizontal(1));
  if let Some(ref err) = state.error {
    let paragraph =
      Paragraph::new(err.as_str()).style(Style::default().fg(theme.error)).wrap(Wrap { trim: true }).block(info_block);
    frame.render_widget(paragraph, info_area);
  } else {
    match state.channel {
      Some(ref channel) => {
        let role = if state.owned { "your channel" } else { "channel" };
        let lines = vec![
          Line::from(vec![
            Span::styled(channel.channel_name.clone(), Style::default().fg(theme.fg).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  ({})", role), Style::default().fg(theme.muted)),
          ]),
          Line::from(Span::styled(channel.about.clone(), Style::default().fg(theme.muted))),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }).block(info_block), info_area);
      }
      None => {
        let paragraph =
          Paragraph::new("Loading channel…").style(Style::default().fg(theme.muted)).block(info_block);
        frame.render_widget(paragraph, info_area);
      }
    }
  }

  let indices = studio::channel_video_indices(catalog.items(), &state.owner_id);
  let inner_w = list_area.width.saturating_sub(4) as usize;
  let items: Vec<ListItem> = indices
    .iter()
    .filter_map(|&idx| catalog.items().get(idx))
    .map(|item| {
      let duration = durations.display(&item.id).to_string();
      let meta = format!("{}  ▲ {}  {}", views_label(item), item.likes, duration);
      let title_max = inner_w.saturating_sub(meta.chars().count() + 2);
      let title = truncate_str(&item.title, title_max);
      let gap = inner_w.saturating_sub(title.chars().count() + meta.chars().count());
      ListItem::new(Line::from(vec![
        Span::styled(title, Style::default().fg(theme.fg)),
        Span::raw(" ".repeat(gap)),
        Span::styled(meta, Style::default().fg(theme.muted)),
      ]))
    })
    .collect();

  let title = format!(" Videos — {} ", indices.len());
  let list = List::new(items)
    .block(
      Block::bordered()
        .title(title)
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .border_type(ratatui::widgets::BorderType::Rounded)
        .border_style(Style::default().fg(theme.border)),
    )
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));
  frame.render_stateful_widget(list, list_area, &mut state.list_state);

  // Delete confirmation overlay
  if let Some(ref video_id) = state.confirm_delete {
    let title = catalog.find(video_id).map(|v| v.title.clone()).unwrap_or_else(|| video_id.clone());
    let overlay = centered_rect(area.width.saturating_sub(10).min(60), 5, area);
    frame.render_widget(Clear, overlay);
    let lines = vec![
      Line::from(Span::styled(
        format!("Delete \"{}\"?", truncate_str(&title, overlay.width.saturating_sub(12) as usize)),
        Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
      )),
      Line::from(""),
      Line::from(Span::styled("y = delete   Esc = keep", Style::default().fg(theme.muted))),
    ];
    let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(
      Block::bordered()
        .title(" Confirm ")
        .title_style(Style::default().fg(theme.error))
        .border_type(ratatui::widgets::BorderType::Rounded)
        .border_style(Style::default().fg(theme.error))
        .style(Style::default().bg(theme.bg)),
    );
    frame.render_widget(paragraph, overlay);
  }

  // Upload/edit modal
  if let ModalState::Open { ref editing_id, ref form } = state.modal {
    let title = if editing_id.is_some() { " Edit video " } else { " Upload video " };
    let height = (form.fields.len() as u16) * 3 + 2;
    let overlay = centered_rect(area.width.saturating_sub(8).min(64), height, area);
    frame.render_widget(Clear, overlay);
    frame.render_widget(
      Block::bordered()
        .title(title)
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .border_type(ratatui::widgets::BorderType::Rounded)
        .border_style(Style::default().fg(theme.accent))
        .style(Style::default().bg(theme.bg)),
      overlay,
    );
    let inner = Rect {
      x: overlay.x + 1,
      y: overlay.y + 1,
      width: overlay.width.saturating_sub(2),
      height: overlay.height.saturating_sub(2),
    };
    render_form_fields(frame, theme, form, inner, true);
  }
}

// --- Auth views ---

fn render_auth(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let title = match app.view {
    View::Login => " Sign in ",
    View::Register => " Create account ",
    View::CreateChannel => " Create your channel ",
    _ => " ",
  };

  let height = (app.auth_form.fields.len() as u16) * 3 + 4;
  let overlay = centered_rect(54.min(area.width), height, area);
  frame.render_widget(
    Block::bordered()
      .title(title)
      .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
      .border_type(ratatui::widgets::BorderType::Rounded)
      .border_style(Style::default().fg(theme.border)),
    overlay,
  );
  let inner = Rect {
    x: overlay.x + 1,
    y: overlay.y + 1,
    width: overlay.width.saturating_sub(2),
    height: overlay.height.saturating_sub(2),
  };
  let [fields_area, error_area] =
    Layout::vertical([Constraint::Length((app.auth_form.fields.len() as u16) * 3), Constraint::Length(2)])
      .areas(inner);
  render_form_fields(frame, theme, &app.auth_form, fields_area, true);

  if let Some(ref err) = app.auth_error {
    let paragraph = Paragraph::new(err.as_str())
      .style(Style::default().fg(theme.error))
      .alignment(Alignment::Center)
      .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, error_area);
  }
}

/// Render a form as a stack of one-line bordered fields. The focused
/// field gets the accent border and the terminal cursor.
fn render_form_fields(frame: &mut Frame, theme: &Theme, form: &Form, area: Rect, show_cursor: bool) {
  let constraints: Vec<Constraint> = form.fields.iter().map(|_| Constraint::Length(3)).collect();
  let rows = Layout::vertical(constraints).split(area);

  for (i, field) in form.fields.iter().enumerate() {
    let Some(&row) = rows.get(i) else { continue };
    let focused = i == form.focused;
    let border_color = if focused { theme.accent } else { theme.border };
    let block = Block::bordered()
      .title(format!(" {} ", field.label))
      .title_style(Style::default().fg(border_color))
      .border_type(ratatui::widgets::BorderType::Rounded)
      .border_style(Style::default().fg(border_color))
      .padding(Padding::horizontal(1));

    let shown = if field.masked { "•".repeat(field.value.chars().count()) } else { field.value.clone() };
    let inner_w = row.width.saturating_sub(4) as usize;
    let paragraph =
      Paragraph::new(truncate_str(&shown, inner_w)).style(Style::default().fg(theme.fg)).block(block);
    frame.render_widget(paragraph, row);

    if focused && show_cursor {
      let cursor_col = if field.masked { field.cursor } else { display_width(&field.value, field.cursor) };
      let cursor_x = row.x + 2 + cursor_col.min(inner_w) as u16;
      frame.set_cursor_position((cursor_x, row.y + 1));
    }
  }
}

// --- Status, footer, alert ---

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(msg) = &app.status_message {
    (format!(" ⏳ {}", msg), Style::default().fg(theme.status))
  } else if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if let Some(info) = &app.info_message {
    (format!(" ℹ {}", info), Style::default().fg(theme.status))
  } else {
    (" Ready".to_string(), Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let modal_open = app.channel_view.as_ref().is_some_and(|s| s.modal.is_open());
  let keys: Vec<(&str, &str)> = if app.alert.is_some() {
    vec![("Enter", "Dismiss")]
  } else {
    match app.view {
      View::Browse if app.search_focused => vec![("Enter", "Done"), ("Esc", "Clear")],
      View::Browse => {
        let auth_label = if app.session.is_some() { "Sign out" } else { "Sign in" };
        vec![
          ("/", "Search"),
          ("Tab", "Category"),
          ("j/k", "Navigate"),
          ("Enter", "Watch"),
          ("c", "My channel"),
          ("o", auth_label),
          ("^t", "Theme"),
          ("Esc", "Quit"),
        ]
      }
      View::Detail => vec![
        ("l/d/s", "Like/Dislike/Sub"),
        ("Tab", "Focus"),
        ("Enter", "Post/Open"),
        ("e", "Edit"),
        ("x", "Delete"),
        ("v", "Channel"),
        ("Esc", "Back"),
      ],
      View::Channel if modal_open => vec![("Tab", "Next field"), ("Enter", "Save"), ("Esc", "Cancel")],
      View::Channel => {
        let mut k = vec![("j/k", "Navigate"), ("Enter", "Watch")];
        if app.channel_view.as_ref().is_some_and(|s| s.owned) {
          k.push(("a", "Add"));
          k.push(("e", "Edit"));
          k.push(("x", "Delete"));
        }
        k.push(("Esc", "Back"));
        k
      }
      View::Login => vec![("Tab", "Next field"), ("Enter", "Sign in"), ("^r", "Register"), ("Esc", "Back")],
      View::Register => vec![("Tab", "Next field"), ("Enter", "Create"), ("Esc", "Back")],
      View::CreateChannel => vec![("Tab", "Next field"), ("Enter", "Create"), ("Esc", "Back")],
    }
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

fn render_alert(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let Some(ref msg) = app.alert else { return };
  let overlay = centered_rect(area.width.saturating_sub(10).min(56), 5, area);
  frame.render_widget(Clear, overlay);
  let lines = vec![
    Line::from(Span::styled(msg.clone(), Style::default().fg(theme.fg).add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(Span::styled("Enter to dismiss", Style::default().fg(theme.muted))),
  ];
  let paragraph = Paragraph::new(lines).alignment(Alignment::Center).wrap(Wrap { trim: true }).block(
    Block::bordered()
      .title(" Error ")
      .title_style(Style::default().fg(theme.error).add_modifier(Modifier::BOLD))
      .border_type(ratatui::widgets::BorderType::Rounded)
      .border_style(Style::default().fg(theme.error))
      .style(Style::default().bg(theme.bg)),
  );
  frame.render_widget(paragraph, overlay);
}
