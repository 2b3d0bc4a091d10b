use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use expense_tracker::{category_index, format_money, KeyValueStore, Kind, NewTransaction, Session, Transaction};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Summary,
    Transactions,
    NewTransaction,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Summary => Page::Transactions,
            Page::Transactions => Page::NewTransaction,
            Page::NewTransaction => Page::Summary,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Summary => Page::NewTransaction,
            Page::Transactions => Page::Summary,
            Page::NewTransaction => Page::Transactions,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Summary => "Resumen",
            Page::Transactions => "Historial",
            Page::NewTransaction => "Nueva Transacción",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Form,
    Editing,
    Renaming,
    ConfirmReset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Kind,
    Category,
    Description,
    Amount,
}

impl FormField {
    fn next(&self) -> Self {
        match self {
            FormField::Kind => FormField::Category,
            FormField::Category => FormField::Description,
            FormField::Description => FormField::Amount,
            FormField::Amount => FormField::Kind,
        }
    }

    fn previous(&self) -> Self {
        match self {
            FormField::Kind => FormField::Amount,
            FormField::Category => FormField::Kind,
            FormField::Description => FormField::Category,
            FormField::Amount => FormField::Description,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Description,
    Category,
    Amount,
}

impl EditField {
    fn next(&self) -> Self {
        match self {
            EditField::Description => EditField::Category,
            EditField::Category => EditField::Amount,
            EditField::Amount => EditField::Description,
        }
    }

    fn previous(&self) -> Self {
        match self {
            EditField::Description => EditField::Amount,
            EditField::Category => EditField::Description,
            EditField::Amount => EditField::Category,
        }
    }
}

/// "New transaction" form contents
#[derive(Debug, Clone)]
pub struct FormState {
    pub kind: Kind,
    pub category: Option<usize>,
    pub description: String,
    pub amount: String,
    pub focus: FormField,
}

impl FormState {
    pub fn new() -> Self {
        Self {
            kind: Kind::Expense,
            category: None,
            description: String::new(),
            amount: String::new(),
            focus: FormField::Kind,
        }
    }

    /// Switching kind invalidates the chosen category
    pub fn set_kind(&mut self, kind: Kind) {
        if self.kind != kind {
            self.kind = kind;
            self.category = None;
        }
    }

    pub fn cycle_category(&mut self, forward: bool) {
        let len = self.kind.categories().len();
        self.category = Some(cycle(self.category, len, forward));
    }

    pub fn selected_category(&self) -> &str {
        self.category
            .and_then(|i| self.kind.categories().get(i).copied())
            .unwrap_or("")
    }

    pub fn to_new_transaction(&self) -> NewTransaction {
        NewTransaction::new(
            self.description.clone(),
            self.amount.clone(),
            self.kind,
            self.selected_category(),
        )
    }

    /// Kind stays, the rest is emptied for the next entry
    pub fn clear_inputs(&mut self) {
        self.description.clear();
        self.amount.clear();
        self.category = None;
        self.focus = FormField::Kind;
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Description => Some(&mut self.description),
            FormField::Amount => Some(&mut self.amount),
            FormField::Kind | FormField::Category => None,
        }
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

fn cycle(current: Option<usize>, len: usize, forward: bool) -> usize {
    match current {
        None if forward => 0,
        None => len.saturating_sub(1),
        Some(i) if forward => (i + 1) % len,
        Some(0) => len.saturating_sub(1),
        Some(i) => i - 1,
    }
}

pub struct App<S: KeyValueStore> {
    pub session: Session<S>,
    pub state: TableState,
    pub current_page: Page,
    pub input_mode: InputMode,
    pub form: FormState,
    pub edit_focus: EditField,
    pub name_input: String,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(session: Session<S>) -> Self {
        let mut state = TableState::default();
        if !session.transactions().is_empty() {
            state.select(Some(0));
        }

        Self {
            session,
            state,
            current_page: Page::Summary,
            input_mode: InputMode::Normal,
            form: FormState::new(),
            edit_focus: EditField::Description,
            name_input: String::new(),
            status: None,
            should_quit: false,
        }
    }

    pub fn selected_transaction(&self) -> Option<&Transaction> {
        self.state
            .selected()
            .and_then(|i| self.session.transactions().get(i))
    }

    pub fn next(&mut self) {
        let len = self.session.transactions().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.session.transactions().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    /// Keep the selection inside the list after it shrinks or grows
    fn clamp_selection(&mut self) {
        let len = self.session.transactions().len();
        match self.state.selected() {
            _ if len == 0 => self.state.select(None),
            Some(i) if i >= len => self.state.select(Some(len - 1)),
            None => self.state.select(Some(0)),
            _ => {}
        }
    }

    // ========================================================================
    // KEY HANDLING
    // ========================================================================

    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Form => self.handle_form_key(key),
            InputMode::Editing => self.handle_edit_key(key),
            InputMode::Renaming => self.handle_rename_key(key),
            InputMode::ConfirmReset => self.handle_confirm_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.current_page = self.current_page.next(),
            KeyCode::BackTab => self.current_page = self.current_page.previous(),
            KeyCode::Char('n') => {
                self.current_page = Page::NewTransaction;
                self.input_mode = InputMode::Form;
                self.status = None;
            }
            KeyCode::Enter if self.current_page == Page::NewTransaction => {
                self.input_mode = InputMode::Form;
            }
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Home => {
                if !self.session.transactions().is_empty() {
                    self.state.select(Some(0));
                }
            }
            KeyCode::End => {
                let len = self.session.transactions().len();
                if len > 0 {
                    self.state.select(Some(len - 1));
                }
            }
            KeyCode::Char('e') | KeyCode::Enter => self.begin_edit(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Char('r') => {
                self.name_input = self.session.user_name().to_string();
                self.input_mode = InputMode::Renaming;
            }
            KeyCode::Char('R') => self.input_mode = InputMode::ConfirmReset,
            _ => {}
        }
    }

    fn begin_edit(&mut self) {
        let Some(id) = self.selected_transaction().map(|tx| tx.id) else {
            return;
        };
        if self.session.start_edit(id) {
            self.current_page = Page::Transactions;
            self.input_mode = InputMode::Editing;
            self.edit_focus = EditField::Description;
            self.status = None;
        }
    }

    fn delete_selected(&mut self) {
        let Some(id) = self.selected_transaction().map(|tx| tx.id) else {
            return;
        };
        if self.session.delete_transaction(id) {
            self.status = Some("🗑️  Transacción eliminada".to_string());
        }
        self.clamp_selection();
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Tab | KeyCode::Down => self.form.focus = self.form.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.form.focus = self.form.focus.previous(),
            KeyCode::Left | KeyCode::Right => {
                let forward = key.code == KeyCode::Right;
                match self.form.focus {
                    FormField::Kind => self.form.set_kind(self.form.kind.toggle()),
                    FormField::Category => self.form.cycle_category(forward),
                    _ => {}
                }
            }
            KeyCode::Backspace => {
                if let Some(text) = self.form.focused_text() {
                    text.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(text) = self.form.focused_text() {
                    text.push(c);
                }
            }
            KeyCode::Enter => self.submit_form(),
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        match self.session.add_transaction(self.form.to_new_transaction()) {
            Some(_) => {
                self.form.clear_inputs();
                self.state.select(Some(0));
                self.status = Some("✓ Transacción agregada".to_string());
            }
            None => {
                self.status = Some("⚠️  Completa categoría, descripción y monto".to_string());
            }
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        let kind = self
            .session
            .editing()
            .and_then(|draft| self.session.ledger().get(draft.id))
            .map(|tx| tx.kind);
        let focus = self.edit_focus;

        match key.code {
            KeyCode::Esc => {
                self.session.cancel_edit();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Tab => self.edit_focus = focus.next(),
            KeyCode::BackTab => self.edit_focus = focus.previous(),
            KeyCode::Enter => {
                self.status = Some(if self.session.save_current_edit() {
                    "✓ Cambios guardados".to_string()
                } else {
                    "⚠️  Valores inválidos, no se guardó".to_string()
                });
                self.input_mode = InputMode::Normal;
            }
            code => {
                let Some(draft) = self.session.editing_mut() else {
                    self.input_mode = InputMode::Normal;
                    return;
                };
                let fields = &mut draft.fields;
                match (focus, code) {
                    (EditField::Category, KeyCode::Left | KeyCode::Right) => {
                        if let Some(kind) = kind {
                            let categories = kind.categories();
                            let current = category_index(kind, &fields.category);
                            let next = cycle(current, categories.len(), code == KeyCode::Right);
                            fields.category = categories[next].to_string();
                        }
                    }
                    (EditField::Description, KeyCode::Char(c)) => fields.description.push(c),
                    (EditField::Description, KeyCode::Backspace) => {
                        fields.description.pop();
                    }
                    (EditField::Amount, KeyCode::Char(c)) => fields.amount.push(c),
                    (EditField::Amount, KeyCode::Backspace) => {
                        fields.amount.pop();
                    }
                    _ => {}
                }
            }
        }
    }

    fn handle_rename_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Enter => {
                let name = std::mem::take(&mut self.name_input);
                self.session.rename_user(&name);
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.name_input.pop();
            }
            KeyCode::Char(c) => self.name_input.push(c),
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('s')) {
            self.session.reset_all();
            self.form = FormState::new();
            self.state.select(None);
            self.status = Some("🔄 Todos los datos fueron borrados".to_string());
        }
        self.input_mode = InputMode::Normal;
    }
}

pub fn run_ui<S: KeyValueStore>(app: &mut App<S>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend, S: KeyValueStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            app.handle_key(key);
            if app.should_quit {
                return Ok(());
            }
        }
    }
}

// ============================================================================
// RENDERING
// ============================================================================

fn ui<S: KeyValueStore>(f: &mut Frame, app: &mut App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Summary => render_summary(f, chunks[1], app),
        Page::Transactions => render_table(f, chunks[1], app),
        Page::NewTransaction => render_form(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);

    match app.input_mode {
        InputMode::Renaming => render_rename_popup(f, app),
        InputMode::ConfirmReset => render_confirm_popup(f),
        _ => {}
    }
}

fn render_header<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let mut spans = vec![Span::styled(
        format!("💰 Control de Gastos de {}", app.session.user_name()),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    spans.push(Span::raw("   "));

    for (i, page) in [Page::Summary, Page::Transactions, Page::NewTransaction]
        .iter()
        .enumerate()
    {
        if i > 0 {
            spans.push(Span::raw(" │ "));
        }
        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(page.title().to_string(), style));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn balance_color(balance: f64) -> Color {
    if balance >= 0.0 {
        Color::Blue
    } else {
        Color::LightRed
    }
}

fn render_summary<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let summary = app.session.summary();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Cards
            Constraint::Length(4), // Message
            Constraint::Min(0),    // Categories
        ])
        .split(area);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(chunks[0]);

    let card = |title: &str, value: String, color: Color| {
        Paragraph::new(Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(format!(" {} ", title)),
        )
    };

    f.render_widget(
        card("Ingresos", format!("${}", format_money(summary.total_income)), Color::Green),
        cards[0],
    );
    f.render_widget(
        card("Gastos", format!("${}", format_money(summary.total_expense)), Color::Red),
        cards[1],
    );
    f.render_widget(
        card(
            "Balance",
            format!("${}", format_money(summary.balance)),
            balance_color(summary.balance),
        ),
        cards[2],
    );
    f.render_widget(
        card("Transacciones", summary.transaction_count.to_string(), Color::Gray),
        cards[3],
    );

    let message_color = if summary.balance >= 0.0 {
        Color::Green
    } else {
        Color::Yellow
    };
    let message = Paragraph::new(app.session.motivational_message())
        .style(Style::default().fg(message_color))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(message, chunks[1]);

    let header = Row::new(["Categoría", "Monto", "% del total"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    }))
    .style(Style::default().bg(Color::DarkGray))
    .height(1);

    let rows = summary.categories.iter().map(|c| {
        Row::new(vec![
            Cell::from(c.category.clone()),
            Cell::from(format!("${}", format_money(c.amount))).style(Style::default().fg(Color::Red)),
            Cell::from(format!("{:.1}%", c.percentage)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(32),
            Constraint::Length(16),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Gastos por Categoría "),
    );

    f.render_widget(table, chunks[2]);
}

fn render_table<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &mut App<S>) {
    if app.session.transactions().is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "¡Comienza agregando tu primera transacción!",
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                "Presiona n para registrar tus ingresos y gastos",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Historial de Transacciones "),
        );
        f.render_widget(empty, area);
        return;
    }

    let header_cells = ["Fecha", "Tipo", "Categoría", "Descripción", "Monto"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let editing = app.session.editing().cloned();
    let edit_focus = app.edit_focus;

    let rows = app.session.transactions().iter().map(|tx| {
        let color = match tx.kind {
            Kind::Income => Color::Green,
            Kind::Expense => Color::Red,
        };

        if let Some(draft) = editing.as_ref().filter(|d| d.id == tx.id) {
            let field = |value: &str, this: EditField| {
                let text = if this == edit_focus {
                    format!("[{}▏]", value)
                } else {
                    value.to_string()
                };
                Cell::from(text).style(Style::default().fg(Color::Yellow))
            };
            return Row::new(vec![
                Cell::from(tx.date.clone()),
                Cell::from(tx.kind.label()).style(Style::default().fg(color)),
                field(&draft.fields.category, EditField::Category),
                field(&draft.fields.description, EditField::Description),
                field(&draft.fields.amount, EditField::Amount),
            ])
            .height(1);
        }

        Row::new(vec![
            Cell::from(tx.date.clone()),
            Cell::from(tx.kind.label()).style(Style::default().fg(color)),
            Cell::from(truncate(&tx.category, 28)),
            Cell::from(truncate(&tx.description, 36)),
            Cell::from(tx.signed_display()).style(Style::default().fg(color)),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(30),
            Constraint::Min(20),
            Constraint::Length(16),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Historial de Transacciones "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_form<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let form = &app.form;
    let active = app.input_mode == InputMode::Form;

    let label = |name: &str, field: FormField| {
        let style = if active && form.focus == field {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let marker = if active && form.focus == field { "▶ " } else { "  " };
        Span::styled(format!("{}{:<13}", marker, name), style)
    };

    let category = if form.category.is_some() {
        format!("◀ {} ▶", form.selected_category())
    } else {
        "◀ Seleccionar... ▶".to_string()
    };

    let content = vec![
        Line::from(""),
        Line::from(vec![
            label("Tipo", FormField::Kind),
            Span::raw(format!("◀ {} ▶", form.kind.label())),
        ]),
        Line::from(""),
        Line::from(vec![label("Categoría", FormField::Category), Span::raw(category)]),
        Line::from(""),
        Line::from(vec![
            label("Descripción", FormField::Description),
            Span::raw(form.description.clone()),
        ]),
        Line::from(""),
        Line::from(vec![label("Monto", FormField::Amount), Span::raw(form.amount.clone())]),
        Line::from(""),
        Line::from(Span::styled(
            if active {
                "  Tab/↑↓ campo | ←/→ elegir | Enter agregar | Esc salir"
            } else {
                "  Presiona n o Enter para completar el formulario"
            },
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )),
    ];

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if active { Color::Yellow } else { Color::White }))
            .title(" Nueva Transacción "),
    );

    f.render_widget(paragraph, area);
}

fn render_status_bar<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let mut status_spans = Vec::new();

    if let Some(status) = &app.status {
        status_spans.push(Span::styled(
            format!(" {} ", status),
            Style::default().fg(Color::Green),
        ));
        status_spans.push(Span::raw("|"));
    }

    let hints: &[(&str, &str)] = match app.input_mode {
        InputMode::Editing => &[("Tab", "Campo"), ("←/→", "Categoría"), ("Enter", "Guardar"), ("Esc", "Cancelar")],
        InputMode::Form => &[("Enter", "Agregar"), ("Esc", "Salir")],
        InputMode::Renaming => &[("Enter", "Guardar"), ("Esc", "Cancelar")],
        InputMode::ConfirmReset => &[("y", "Confirmar"), ("otra", "Cancelar")],
        InputMode::Normal => &[
            ("Tab", "Página"),
            ("n", "Nueva"),
            ("e", "Editar"),
            ("d", "Borrar"),
            ("r", "Nombre"),
            ("R", "Reset"),
            ("q", "Salir"),
        ],
    };

    for (i, (key, action)) in hints.iter().enumerate() {
        if i > 0 {
            status_spans.push(Span::raw(" |"));
        }
        status_spans.push(Span::styled(
            format!(" {}", key),
            Style::default().fg(Color::Yellow),
        ));
        status_spans.push(Span::raw(format!(" {}", action)));
    }

    let status_bar = Paragraph::new(Line::from(status_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_rename_popup<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    let area = centered_rect(50, 5, f.size());
    let popup = Paragraph::new(format!("{}▏", app.name_input)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Tu nombre "),
    );
    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

fn render_confirm_popup(f: &mut Frame) {
    let area = centered_rect(60, 6, f.size());
    let popup = Paragraph::new(vec![
        Line::from("¿Estás seguro de que quieres borrar todos los datos?"),
        Line::from(Span::styled(
            "Esta acción no se puede deshacer. (y = sí)",
            Style::default().fg(Color::Red),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(" Reset "),
    );
    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

/// Rect of `percent_x` width and `height` rows centered in `r`
fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use expense_tracker::{MemoryStore, DEFAULT_USER_NAME};

    fn app() -> App<MemoryStore> {
        App::new(Session::open(MemoryStore::new(), DEFAULT_USER_NAME).unwrap())
    }

    fn press(app: &mut App<MemoryStore>, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App<MemoryStore>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    /// Fill and submit the form: expense, first category, given values
    fn add_expense(app: &mut App<MemoryStore>, description: &str, amount: &str) {
        press(app, KeyCode::Char('n'));
        press(app, KeyCode::Tab); // Category
        press(app, KeyCode::Right); // Transporte
        press(app, KeyCode::Tab); // Description
        type_text(app, description);
        press(app, KeyCode::Tab); // Amount
        type_text(app, amount);
        press(app, KeyCode::Enter);
        press(app, KeyCode::Esc);
    }

    #[test]
    fn test_form_adds_transaction() {
        let mut app = app();
        add_expense(&mut app, "Colectivo", "200");

        let txs = app.session.transactions();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].category, "Transporte");
        assert_eq!(txs[0].amount, 200.0);
        assert_eq!(app.state.selected(), Some(0));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.form.description, "", "Form clears after a successful add");
    }

    #[test]
    fn test_incomplete_form_is_rejected() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Sin categoría");
        press(&mut app, KeyCode::Enter);

        assert!(app.session.transactions().is_empty());
        assert_eq!(app.form.description, "Sin categoría", "Input is kept for correction");
        assert!(app.status.is_some());
    }

    #[test]
    fn test_kind_change_clears_category() {
        let mut form = FormState::new();
        form.cycle_category(true);
        assert_eq!(form.selected_category(), "Transporte");

        form.set_kind(Kind::Income);
        assert_eq!(form.category, None);
        assert_eq!(form.selected_category(), "");

        form.cycle_category(false);
        assert_eq!(form.selected_category(), "Otros Ingresos");
    }

    #[test]
    fn test_edit_and_cancel() {
        let mut app = app();
        add_expense(&mut app, "Colectivo", "200");

        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.input_mode, InputMode::Editing);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.session.transactions()[0].description, "Colectivo");
        assert!(app.session.editing().is_none());
    }

    #[test]
    fn test_edit_and_save() {
        let mut app = app();
        add_expense(&mut app, "Colectivo", "200");

        press(&mut app, KeyCode::Char('e'));
        type_text(&mut app, " 60");
        press(&mut app, KeyCode::Tab); // Category
        press(&mut app, KeyCode::Right); // Alimentación
        press(&mut app, KeyCode::Tab); // Amount
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);

        let tx = &app.session.transactions()[0];
        assert_eq!(tx.description, "Colectivo 60");
        assert_eq!(tx.category, "Alimentación");
        assert_eq!(tx.amount, 2.0);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_delete_clamps_selection() {
        let mut app = app();
        add_expense(&mut app, "Uno", "1");
        add_expense(&mut app, "Dos", "2");

        press(&mut app, KeyCode::End);
        assert_eq!(app.state.selected(), Some(1));
        press(&mut app, KeyCode::Char('d'));

        assert_eq!(app.session.transactions().len(), 1);
        assert_eq!(app.state.selected(), Some(0));

        press(&mut app, KeyCode::Char('d'));
        assert!(app.session.transactions().is_empty());
        assert_eq!(app.state.selected(), None);
    }

    #[test]
    fn test_rename_and_reset() {
        let mut app = app();
        press(&mut app, KeyCode::Char('r'));
        for _ in 0..DEFAULT_USER_NAME.chars().count() {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "Fiorella");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session.user_name(), "Fiorella");

        add_expense(&mut app, "Colectivo", "200");

        // Any key other than y cancels
        press(&mut app, KeyCode::Char('R'));
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.session.transactions().len(), 1);

        press(&mut app, KeyCode::Char('R'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.session.transactions().is_empty());
        assert_eq!(app.session.user_name(), DEFAULT_USER_NAME);
    }

    #[test]
    fn test_page_cycle_and_quit() {
        let mut app = app();
        assert_eq!(app.current_page, Page::Summary);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.current_page, Page::Transactions);
        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.current_page, Page::NewTransaction);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("Alimentación", 20), "Alimentación");
        assert_eq!(truncate("Productos de Cuidado Personal", 12), "Productos...");
        assert_eq!(truncate("ñññññ", 4), "ñ...");
    }
}
