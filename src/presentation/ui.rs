use crate::application::{descriptor, App, AppMode, QrImageState, StepInput};
use crate::domain::{BusColor, FareCalculator, Ticket, TicketCount, WizardPhase, WizardStep};
use crate::infrastructure::QrImage;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

const QR_PLACEHOLDER: [&str; 7] = [
    "█▀▀▀▀▀█ ▄ ▀ █▀▀▀▀▀█",
    "█ ███ █ ▀█▄ █ ███ █",
    "█ ▀▀▀ █ ▄▀█ █ ▀▀▀ █",
    "▀▀▀▀▀▀▀ █ ▀ ▀▀▀▀▀▀▀",
    "▀▄█ ▀▄▀ ▄▀▄▀ ▄ ▀█▄ ",
    "█▀▀▀▀▀█  ▄▀▄█ ▀ ▄▀█",
    "▀▀▀▀▀▀▀ ▀ ▀▀ ▀▀ ▀▀▀",
];

pub fn theme_color(color: Option<BusColor>) -> Color {
    match color {
        Some(BusColor::Red) | None => Color::Red,
        Some(BusColor::BlueDark) => Color::Blue,
        Some(BusColor::BlueLight) => Color::LightBlue,
        Some(BusColor::Orange) => Color::Rgb(255, 140, 0),
    }
}

fn rupees(amount: f64) -> String {
    format!("₹{}", FareCalculator::format_amount(amount))
}

pub fn render_ui(f: &mut Frame, app: &App) {
    match app.wizard.phase() {
        WizardPhase::Step(step) => render_wizard(f, app, step),
        WizardPhase::Finalized => {
            if let Some(ticket) = app.wizard.ticket() {
                render_ticket(f, app, &ticket);
                if app.mode == AppMode::QrModal {
                    render_qr_modal(f, app, &ticket);
                }
            }
        }
    }

    if app.mode == AppMode::Help {
        render_help_popup(f, app.help_scroll);
    }
}

fn render_wizard(f: &mut Frame, app: &App, step: WizardStep) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    let header = Paragraph::new("Delhi Bus Ticket Booking")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    f.render_widget(header, chunks[0]);

    let progress = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(Color::Blue))
        .ratio(f64::from(step.number()) / f64::from(WizardStep::COUNT))
        .label(format!("Step {} of {}", step, WizardStep::COUNT));
    f.render_widget(progress, chunks[1]);

    render_step_body(f, app, step, chunks[2]);
    render_wizard_status(f, app, step, chunks[3]);
}

fn render_step_body(f: &mut Frame, app: &App, step: WizardStep, area: Rect) {
    let row = descriptor(step);
    let block = Block::default().borders(Borders::ALL).title(row.title);
    let record = app.wizard.record();

    match row.input {
        StepInput::ColorChoice => {
            let items: Vec<ListItem> = BusColor::ALL
                .iter()
                .enumerate()
                .map(|(i, color)| {
                    let selected = record.bus_color == Some(*color);
                    let marker = if selected { "(•)" } else { "( )" };
                    let mut style = Style::default().fg(theme_color(Some(*color)));
                    if selected {
                        style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
                    }
                    ListItem::new(Line::styled(
                        format!("{} {}. {} Bus", marker, i + 1, color),
                        style,
                    ))
                })
                .collect();
            f.render_widget(List::new(items).block(block), area);
        }
        StepInput::TicketCount => {
            let items: Vec<ListItem> = (TicketCount::MIN..=TicketCount::MAX)
                .map(|count| {
                    let selected = record.ticket_count.get() == count;
                    let marker = if selected { "(•)" } else { "( )" };
                    let plural = if count > 1 { "s" } else { "" };
                    let style = if selected {
                        Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    ListItem::new(Line::styled(format!("{marker} {count} Ticket{plural}"), style))
                })
                .collect();
            f.render_widget(List::new(items).block(block), area);
        }
        StepInput::Text | StepInput::Fare => {
            let prefix = if row.input == StepInput::Fare { "₹ " } else { "> " };
            let value_line = if app.input.is_empty() {
                Line::from(vec![
                    Span::raw(prefix),
                    Span::styled(row.placeholder, Style::default().fg(Color::DarkGray)),
                ])
            } else {
                Line::from(vec![Span::raw(prefix), Span::raw(app.input.as_str())])
            };
            let lines = vec![
                Line::styled(row.hint, Style::default().fg(Color::Gray)),
                Line::raw(""),
                value_line,
            ];
            f.render_widget(Paragraph::new(lines).block(block), area);

            if app.mode == AppMode::Wizard {
                let cursor_x = area
                    .x
                    .saturating_add(1)
                    .saturating_add(cursor_column(prefix, &app.input, app.cursor_position));
                f.set_cursor_position((cursor_x.min(area.right().saturating_sub(2)), area.y + 3));
            }
        }
        StepInput::Summary => {
            let you_pay = record
                .fare
                .and_then(|fare| FareCalculator::discount(fare).ok())
                .map(rupees)
                .unwrap_or_else(|| "-".to_string());
            let original = record.fare.map(rupees).unwrap_or_else(|| "-".to_string());
            let bus_type = record.bus_color.map(|c| c.label()).unwrap_or("-");

            let pairs = [
                ("Bus Type", bus_type.to_string()),
                ("Bus Number", record.bus_number.clone()),
                ("Route", record.bus_route.clone()),
                ("From", record.starting_stop.clone()),
                ("To", record.ending_stop.clone()),
                ("Tickets", record.ticket_count.to_string()),
                ("Original Fare", original),
            ];
            let mut lines: Vec<Line> = pairs
                .into_iter()
                .map(|(label, value)| {
                    Line::from(vec![
                        Span::styled(format!("{label:<15}"), Style::default().fg(Color::Gray)),
                        Span::raw(value),
                    ])
                })
                .collect();
            lines.push(Line::raw(""));
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{:<15}", "You Pay (10% off)"),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    you_pay,
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ),
            ]));
            f.render_widget(Paragraph::new(lines).block(block), area);
        }
    }
}

fn render_wizard_status(f: &mut Frame, app: &App, step: WizardStep, area: Rect) {
    let next_label = if step.is_last() { "Generate Ticket" } else { "Next" };
    let back = if step.is_first() { "" } else { "Esc: back | " };
    let text = match &app.status_message {
        Some(status) => status.clone(),
        None => format!("Enter: {next_label} | {back}Ctrl+R: start over | F1: help | Ctrl+Q: quit"),
    };
    let style = if app.wizard.can_advance() {
        Style::default()
    } else {
        Style::default().fg(Color::Yellow)
    };
    let status = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(style);
    f.render_widget(status, area);
}

fn render_ticket(f: &mut Frame, app: &App, ticket: &Ticket<'_>) {
    let theme = theme_color(ticket.booking.bus_color);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let label = Style::default().fg(Color::Gray);
    let strong = Style::default().add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::styled("Transport Dept. of Delhi", strong).alignment(Alignment::Center),
        Line::raw(""),
        Line::from(vec![
            Span::styled(format!("{:<24}", ticket.booking.bus_number), strong),
            Span::styled(rupees(ticket.discounted_fare()), strong),
        ]),
        Line::raw(""),
        Line::from(vec![
            Span::styled(format!("{:<24}", "Bus Route"), label),
            Span::styled("Fare", label),
        ]),
        Line::from(vec![
            Span::raw(format!("{:<24}", ticket.booking.bus_route)),
            Span::raw(rupees(ticket.fare())),
        ]),
        Line::from(vec![
            Span::styled(format!("{:<24}", "Booking Time"), label),
            Span::styled("Tickets", label),
        ]),
        Line::from(vec![
            Span::raw(format!("{:<24}", ticket.booking_time())),
            Span::raw(ticket.booking.ticket_count.to_string()),
        ]),
        Line::raw(""),
        Line::styled("Starting stop", label),
        Line::raw(ticket.booking.starting_stop.as_str()),
        Line::styled("Ending stop", label),
        Line::raw(ticket.booking.ending_stop.as_str()),
        Line::raw(""),
        Line::styled(ticket.transaction_id(), Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        Line::raw(""),
        Line::styled("[s] Show QR code", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
    ];

    let card = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme))
            .title(format!("{} Bus Ticket", ticket.booking.bus_color.map(|c| c.label()).unwrap_or("Bus"))),
    );
    f.render_widget(card, chunks[0]);

    let text = app.status_message.clone().unwrap_or_else(|| {
        "s: show QR | c: copy transaction ID | j: copy ticket JSON | n: book another | q: quit".to_string()
    });
    let status = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(Style::default().fg(theme));
    f.render_widget(status, chunks[1]);
}

fn render_qr_modal(f: &mut Frame, app: &App, ticket: &Ticket<'_>) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 8,
        y: area.height / 10,
        width: area.width * 3 / 4,
        height: area.height * 4 / 5,
    };
    f.render_widget(Clear, popup_area);

    let mut lines = vec![
        Line::styled("Scan this code with the conductor", Style::default().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        Line::raw(""),
    ];

    match &app.qr_image {
        QrImageState::Idle | QrImageState::Loading => {
            lines.push(Line::styled("Fetching QR image...", Style::default().fg(Color::Yellow)));
        }
        QrImageState::Ready(QrImage::Loaded { url, content_type, bytes }) => {
            lines.push(Line::styled(
                format!("QR image ready ({bytes} bytes, {content_type})"),
                Style::default().fg(Color::Green),
            ));
            lines.push(Line::raw(format!("Open: {url}")));
        }
        QrImageState::Ready(QrImage::Placeholder { url, reason }) => {
            for row in QR_PLACEHOLDER {
                lines.push(Line::raw(row).alignment(Alignment::Center));
            }
            lines.push(Line::styled(
                format!("QR image unavailable: {reason}"),
                Style::default().fg(Color::DarkGray),
            ));
            if let Some(url) = url {
                lines.push(Line::raw(format!("Open: {url}")));
            }
        }
    }

    lines.push(Line::raw(""));
    lines.push(Line::styled("QR Code Data (Raw)", Style::default().fg(Color::Gray)));
    lines.push(Line::raw(ticket.qr_payload()));

    let modal = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("QR Code | c: copy data | Esc: close"),
        );
    f.render_widget(modal, popup_area);
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_lines: Vec<&str> = HELP_TEXT.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("busticket Help (Line {}/{})", start_line + 1, help_lines.len()))
                .style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

const HELP_TEXT: &str = r#"BUS TICKET BOOKING

=== STEPS ===
1  Bus type         Red, Blue Dark, Blue Light or Orange
2  Bus number       Registration number, stored in capitals
3  Bus route        Route code or name
4  Starting stop    Where you board
5  Ending stop      Where you get off
6  Fare             Original fare per ticket, must be above zero
7  Tickets          1 to 5
8  Confirm          Shows the 10% discounted price

=== WIZARD KEYS ===
Enter / Tab     Next (Generate Ticket on the last step)
Esc / Shift+Tab Back one step
Up / Down       Change bus type or ticket count
1-4             Pick bus type directly
1-5             Pick ticket count directly
Ctrl+R          Start over
F1              Show this help
Ctrl+Q / Ctrl+C Quit

=== TICKET KEYS ===
s / Enter       Show QR code
c               Copy transaction ID
j               Copy the whole ticket as JSON
n               Book another ticket
q               Quit

=== QR CODE ===
c               Copy the raw QR data
Esc / Enter     Close

=== HELP NAVIGATION ===
Up/Down or j/k  Scroll one line
Page Up/Down    Scroll five lines
Home            Jump to top
Esc/F1/?/q      Close this help window

Note: nothing is saved. Starting over discards the current ticket."#;

/// Screen column of the input cursor, counted in display cells so that
/// combining marks and wide glyphs line up with what the terminal draws.
fn cursor_column(prefix: &str, input: &str, cursor: usize) -> u16 {
    let end = input
        .char_indices()
        .nth(cursor)
        .map_or(input.len(), |(offset, _)| offset);
    let width = Span::raw(prefix).width() + Span::raw(&input[..end]).width();
    u16::try_from(width).unwrap_or(u16::MAX)
}
