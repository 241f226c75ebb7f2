use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use loot_core::analysis::{self, LootReport};
use loot_core::config::ConfigError;
use loot_core::generator::Generator;
use loot_core::storage::{DropCollection, StoredDrop};
use loot_core::{Item, ItemKind, LootContext, LootRequest, Rarity};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "loot_tui.log";
const EXPORT_FILE: &str = "drops.json";
const SIMULATION_SAMPLES: usize = 10_000;
const MAGIC_FIND_STEPS: [f64; 6] = [0.0, 25.0, 50.0, 100.0, 200.0, 500.0];
const MAX_LEVEL: u32 = 100;

fn main() -> Result<(), io::Error> {
    init_logging();

    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config"));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Load loot tables and create app
    let mut app = match Generator::load_from_dir(&data_dir) {
        Ok(generator) => App::new(generator),
        Err(e) => {
            tracing::error!(error = %e, "failed to load loot tables");
            App::with_config_error(e)
        }
    };

    // Run app
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {err:?}");
    }

    Ok(())
}

/// Log to a file; the terminal belongs to the UI
fn init_logging() {
    let Ok(file) = File::create(LOG_FILE) else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

#[derive(PartialEq, Eq, Clone, Copy)]
enum DetailTab {
    Stats,
    Seed,
    Analysis,
}

struct App {
    generator: Option<Generator>,
    drops: Vec<(Item, StoredDrop)>,
    drop_state: ListState,
    detail_tab: DetailTab,
    message: Option<String>,
    player_level: u32,
    dungeon_level: u32,
    magic_find_step: usize,
    theme: Option<usize>,
    archetype: Option<usize>,
    class: Option<usize>,
    /// Result of the last simulation run
    report: Option<LootReport>,
    /// Config error if loading failed
    config_error: Option<ConfigError>,
}

impl App {
    fn new(generator: Generator) -> Self {
        App {
            generator: Some(generator),
            ..App::empty()
        }
    }

    fn with_config_error(error: ConfigError) -> Self {
        App {
            config_error: Some(error),
            ..App::empty()
        }
    }

    fn empty() -> Self {
        App {
            generator: None,
            drops: Vec::new(),
            drop_state: ListState::default(),
            detail_tab: DetailTab::Stats,
            message: None,
            player_level: 1,
            dungeon_level: 1,
            magic_find_step: 0,
            theme: None,
            archetype: None,
            class: None,
            report: None,
            config_error: None,
        }
    }

    fn magic_find(&self) -> f64 {
        MAGIC_FIND_STEPS[self.magic_find_step]
    }

    fn selected_drop(&self) -> Option<&(Item, StoredDrop)> {
        self.drop_state.selected().and_then(|i| self.drops.get(i))
    }

    fn theme_name(&self) -> Option<String> {
        let generator = self.generator.as_ref()?;
        let index = self.theme?;
        generator.data().theme_names().get(index).map(|s| s.to_string())
    }

    fn archetype_name(&self) -> Option<String> {
        let generator = self.generator.as_ref()?;
        let index = self.archetype?;
        generator
            .data()
            .archetype_names()
            .get(index)
            .map(|s| s.to_string())
    }

    fn class_name(&self) -> Option<String> {
        let generator = self.generator.as_ref()?;
        let index = self.class?;
        generator.data().class_names().get(index).map(|s| s.to_string())
    }

    fn context(&self) -> Option<LootContext> {
        let theme = self.theme_name();
        let archetype = self.archetype_name();
        let class = self.class_name();
        if theme.is_none() && archetype.is_none() && class.is_none() {
            return None;
        }
        Some(LootContext {
            player_class: class,
            dungeon_theme: theme,
            enemy_archetype: archetype,
            weapon_type: None,
        })
    }

    fn request(&self, guaranteed: bool) -> LootRequest {
        let mut request = LootRequest::new(self.player_level, self.dungeon_level)
            .with_magic_find(self.magic_find());
        if let Some(context) = self.context() {
            request = request.with_context(context);
        }
        if guaranteed {
            request = request.guaranteed();
        }
        request
    }

    fn roll_drop(&mut self, guaranteed: bool) {
        let Some(generator) = self.generator.as_ref() else {
            return;
        };
        let request = self.request(guaranteed);
        let seed: u64 = rand::random();

        match generator.generate_seeded(&request, seed) {
            Some(item) => {
                self.message = Some(format!("Dropped: {} ({})", item.name, item.rarity));
                self.drops.push((item, StoredDrop::new(request, seed)));
                self.drop_state.select(Some(self.drops.len() - 1));
            }
            None => {
                let chance = generator.drop_chance(&request) * 100.0;
                self.message = Some(format!("No drop ({:.0}% chance)", chance));
            }
        }
    }

    fn delete_selected(&mut self) {
        let Some(selected) = self.drop_state.selected() else {
            return;
        };
        if selected < self.drops.len() {
            self.drops.remove(selected);
            if self.drops.is_empty() {
                self.drop_state.select(None);
            } else if selected >= self.drops.len() {
                self.drop_state.select(Some(self.drops.len() - 1));
            }
        }
    }

    fn simulate(&mut self) {
        let Some(generator) = self.generator.as_ref() else {
            return;
        };
        let request = self.request(false);
        let report = analysis::simulate(generator, &request, SIMULATION_SAMPLES, rand::random());
        self.message = Some(format!(
            "Simulated {} rolls: {:.1}% dropped",
            report.samples,
            report.drop_rate() * 100.0
        ));
        self.report = Some(report);
        self.detail_tab = DetailTab::Analysis;
    }

    fn reload(&mut self) {
        let Some(generator) = self.generator.as_mut() else {
            return;
        };
        match generator.reload() {
            Ok(()) => {
                self.theme = None;
                self.archetype = None;
                self.class = None;
                self.report = None;
                self.message = Some("Reloaded loot tables".to_string());
            }
            Err(e) => {
                tracing::warn!(error = %e, "reload failed, keeping previous tables");
                self.message = Some(format!("Reload failed: {}", e));
            }
        }
    }

    fn export(&mut self) {
        let collection = DropCollection {
            drops: self.drops.iter().map(|(_, stored)| stored.clone()).collect(),
        };
        let path = Path::new(EXPORT_FILE);
        self.message = Some(match collection.save_to_file(path) {
            Ok(()) => format!("Exported {} drops to {}", collection.len(), path.display()),
            Err(e) => format!("Export failed: {}", e),
        });
    }

    fn cycle_theme(&mut self) {
        let count = self
            .generator
            .as_ref()
            .map_or(0, |g| g.data().theme_names().len());
        self.theme = cycle(self.theme, count);
    }

    fn cycle_archetype(&mut self) {
        let count = self
            .generator
            .as_ref()
            .map_or(0, |g| g.data().archetype_names().len());
        self.archetype = cycle(self.archetype, count);
    }

    fn cycle_class(&mut self) {
        let count = self
            .generator
            .as_ref()
            .map_or(0, |g| g.data().class_names().len());
        self.class = cycle(self.class, count);
    }
}

/// Step through `None, Some(0), .., Some(count - 1), None`
fn cycle(current: Option<usize>, count: usize) -> Option<usize> {
    match current {
        None if count > 0 => Some(0),
        Some(i) if i + 1 < count => Some(i + 1),
        _ => None,
    }
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            // Only handle key press events, not release or repeat
            if key.kind != KeyEventKind::Press {
                continue;
            }

            // Clear message on any keypress
            app.message = None;

            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(())
                }
                _ if app.config_error.is_some() => {}
                KeyCode::Tab => {
                    app.detail_tab = match app.detail_tab {
                        DetailTab::Stats => DetailTab::Seed,
                        DetailTab::Seed => DetailTab::Analysis,
                        DetailTab::Analysis => DetailTab::Stats,
                    };
                }
                KeyCode::Char('g') => app.roll_drop(false),
                KeyCode::Char('G') => app.roll_drop(true),
                KeyCode::Char('+') | KeyCode::Char('=') => {
                    app.player_level = (app.player_level + 1).min(MAX_LEVEL);
                }
                KeyCode::Char('-') => {
                    app.player_level = app.player_level.saturating_sub(1).max(1);
                }
                KeyCode::Char(']') => {
                    app.dungeon_level = (app.dungeon_level + 1).min(MAX_LEVEL);
                }
                KeyCode::Char('[') => {
                    app.dungeon_level = app.dungeon_level.saturating_sub(1).max(1);
                }
                KeyCode::Char('m') => {
                    app.magic_find_step = (app.magic_find_step + 1) % MAGIC_FIND_STEPS.len();
                }
                KeyCode::Char('t') => app.cycle_theme(),
                KeyCode::Char('a') => app.cycle_archetype(),
                KeyCode::Char('w') => app.cycle_class(),
                KeyCode::Char('s') => app.simulate(),
                KeyCode::Char('r') => app.reload(),
                KeyCode::Char('e') => app.export(),
                KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
                KeyCode::Up | KeyCode::Char('k') => {
                    if let Some(selected) = app.drop_state.selected() {
                        if selected > 0 {
                            app.drop_state.select(Some(selected - 1));
                        }
                    }
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if let Some(selected) = app.drop_state.selected() {
                        if selected < app.drops.len().saturating_sub(1) {
                            app.drop_state.select(Some(selected + 1));
                        }
                    } else if !app.drops.is_empty() {
                        app.drop_state.select(Some(0));
                    }
                }
                _ => {}
            }
        }
    }
}

fn rarity_color(rarity: Rarity) -> Color {
    match rarity {
        Rarity::Common => Color::White,
        Rarity::Uncommon => Color::Green,
        Rarity::Rare => Color::Blue,
        Rarity::Epic => Color::Magenta,
        Rarity::Legendary => Color::Rgb(255, 165, 0),
        Rarity::Mythic => Color::Red,
        Rarity::Transcendent => Color::Cyan,
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    // If there's a config error, show it instead of the normal UI
    if let Some(ref error) = app.config_error {
        render_config_error(f, error);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[1]);

    render_request_bar(f, app, chunks[0]);
    render_drops(f, app, main_chunks[0]);
    render_detail(f, app, main_chunks[1]);
    render_help(f, app, chunks[2]);
}

fn render_config_error(f: &mut Frame, error: &ConfigError) {
    let area = f.area();

    // Create centered area for error display
    let error_area = centered_rect(80, 60, area);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Loot Table Error", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        ]),
        Line::from(""),
    ];

    let error_type = match error {
        ConfigError::Io { .. } => "File I/O Error",
        ConfigError::Parse { .. } => "TOML Parse Error",
    };
    lines.push(Line::from(vec![
        Span::styled("Type: ", Style::default().fg(Color::Yellow)),
        Span::raw(error_type),
    ]));
    lines.push(Line::from(""));

    lines.push(Line::from(vec![
        Span::styled("Location:", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
    ]));
    for line in error.location_description().lines() {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(line.to_string(), Style::default().fg(Color::Cyan)),
        ]));
    }
    lines.push(Line::from(""));

    lines.push(Line::from(vec![
        Span::styled("Error:", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
    ]));
    for line in error.error_message().lines() {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::raw(line.to_string()),
        ]));
    }
    lines.push(Line::from(""));

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Press ", Style::default().fg(Color::DarkGray)),
        Span::styled("q", Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::styled(" to quit and fix the data file.", Style::default().fg(Color::DarkGray)),
    ]));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Loot Table Error ")
                .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        )
        .wrap(Wrap { trim: false });

    f.render_widget(ratatui::widgets::Clear, error_area);
    f.render_widget(paragraph, error_area);
}

fn render_request_bar(f: &mut Frame, app: &App, area: Rect) {
    let label = |s: &str| Span::styled(s.to_string(), Style::default().fg(Color::Gray));
    let value = |s: String| Span::styled(s, Style::default().fg(Color::Yellow));
    let none = || "-".to_string();

    let loot_level = loot_core::tier::compute_loot_level(app.player_level, app.dungeon_level);
    let chance = app
        .generator
        .as_ref()
        .map_or(0.0, |g| g.drop_chance(&app.request(false)) * 100.0);

    let line = Line::from(vec![
        label("Player "),
        value(app.player_level.to_string()),
        label("  Dungeon "),
        value(app.dungeon_level.to_string()),
        label("  Loot Lvl "),
        value(loot_level.to_string()),
        label("  MF "),
        value(format!("{:.0}", app.magic_find())),
        label("  Drop "),
        value(format!("{:.0}%", chance)),
        label("  Theme "),
        value(app.theme_name().unwrap_or_else(none)),
        label("  Enemy "),
        value(app.archetype_name().unwrap_or_else(none)),
        label("  Class "),
        value(app.class_name().unwrap_or_else(none)),
    ]);

    let bar = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(" Request "));
    f.render_widget(bar, area);
}

fn render_drops(f: &mut Frame, app: &mut App, area: Rect) {
    let items: Vec<ListItem> = app
        .drops
        .iter()
        .map(|(item, _)| {
            ListItem::new(Line::from(vec![
                Span::styled(&item.name, Style::default().fg(rarity_color(item.rarity))),
                Span::raw(" "),
                Span::styled(
                    format!("({}, {})", item.rarity, item.tier),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Drops "),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, &mut app.drop_state);
}

fn render_detail(f: &mut Frame, app: &App, area: Rect) {
    let tabs = Tabs::new(vec!["Stats", "Seed", "Analysis"])
        .select(match app.detail_tab {
            DetailTab::Stats => 0,
            DetailTab::Seed => 1,
            DetailTab::Analysis => 2,
        })
        .style(Style::default())
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let tab_block = Block::default()
        .borders(Borders::ALL)
        .title(" Drop Detail ");
    f.render_widget(tabs.block(tab_block), chunks[0]);

    let content = match app.detail_tab {
        DetailTab::Stats => match app.selected_drop() {
            Some((item, _)) => render_item_stats(item),
            None => Text::from("No drop selected\n\nPress 'g' to roll a drop, 'G' for a guaranteed one"),
        },
        DetailTab::Seed => match app.selected_drop() {
            Some((_, stored)) => render_drop_seed(stored),
            None => Text::from("No drop selected\n\nPress 'g' to roll a drop, 'G' for a guaranteed one"),
        },
        DetailTab::Analysis => match app.generator.as_ref() {
            Some(generator) => render_analysis(app, generator),
            None => Text::from("No loot tables loaded"),
        },
    };

    let paragraph = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, chunks[1]);
}

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ))
}

fn field(name: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", name), Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(color)),
    ])
}

fn render_item_stats(item: &Item) -> Text<'static> {
    let mut lines: Vec<Line> = Vec::new();

    // Header
    lines.push(Line::from(vec![Span::styled(
        item.name.clone(),
        Style::default()
            .fg(rarity_color(item.rarity))
            .add_modifier(Modifier::BOLD),
    )]));
    lines.push(Line::from(vec![
        Span::styled(item.base_name.clone(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("({} {} {})", item.rarity, item.tier, item.slot_name()),
            Style::default().fg(Color::DarkGray),
        ),
    ]));
    lines.push(Line::from(""));

    match &item.kind {
        ItemKind::Weapon(w) => {
            lines.push(heading("Weapon"));
            lines.push(field("Type", w.weapon_type.to_string(), Color::White));
            lines.push(field(
                "Damage",
                format!("{} (+{})", w.base_damage, w.bonus_damage),
                Color::Red,
            ));
            lines.push(field(
                "Attack Speed",
                format!("{:.2} (+{})", w.attack_speed, w.bonus_attack_speed),
                Color::Yellow,
            ));
        }
        ItemKind::Head(a) | ItemKind::Chest(a) | ItemKind::Feet(a) => {
            lines.push(heading("Armor"));
            lines.push(field("Armor", a.armor.to_string(), Color::White));
            if let Some(total) = item.total_armor() {
                lines.push(field("Total Armor", total.to_string(), Color::Cyan));
            }
            if let Some(ref action) = a.gear_action {
                lines.push(field("Gear Action", action.clone(), Color::Magenta));
            }
        }
    }
    lines.push(Line::from(""));

    if !item.stat_bonuses.is_empty() {
        lines.push(heading("Stat Bonuses"));
        for b in &item.stat_bonuses {
            lines.push(Line::from(vec![
                Span::styled(format!("  {}", b.name), Style::default().fg(Color::Green)),
                Span::styled(
                    format!("  +{} {}", b.value, b.stat_type),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
        }
        lines.push(Line::from(""));
    }

    if !item.action_bonuses.is_empty() {
        lines.push(heading("Action Bonuses"));
        for b in &item.action_bonuses {
            lines.push(Line::from(Span::styled(
                format!("  {}", b.name),
                Style::default().fg(Color::Magenta),
            )));
        }
        lines.push(Line::from(""));
    }

    if !item.modifications.is_empty() {
        lines.push(heading("Modifications"));
        for m in &item.modifications {
            let mut spans = vec![
                Span::styled(format!("  [{:>2}] ", m.dice_result), Style::default().fg(Color::DarkGray)),
                Span::styled(m.name.clone(), Style::default().fg(Color::Blue)),
                Span::styled(
                    format!("  {:.2} ({:.2}-{:.2})", m.rolled_value, m.min_value, m.max_value),
                    Style::default().fg(Color::DarkGray),
                ),
            ];
            if m.is_reroll() {
                spans.push(Span::styled(" reroll", Style::default().fg(Color::Yellow)));
            }
            if let Some(rank) = m.item_rank {
                spans.push(Span::styled(
                    format!(" min {}", rank),
                    Style::default().fg(rarity_color(rank)),
                ));
            }
            lines.push(Line::from(spans));
        }
    }

    Text::from(lines)
}

fn render_drop_seed(stored: &StoredDrop) -> Text<'static> {
    let mut lines: Vec<Line> = Vec::new();

    lines.push(heading("Seed Data"));
    lines.push(Line::from(""));
    lines.push(field("Seed", format!("0x{:016X}", stored.seed), Color::Yellow));

    let request = &stored.request;
    lines.push(field("Player Level", request.player_level.to_string(), Color::White));
    lines.push(field("Dungeon Level", request.dungeon_level.to_string(), Color::White));
    lines.push(field("Magic Find", format!("{:.0}", request.magic_find), Color::White));
    lines.push(field("Guaranteed", request.guaranteed.to_string(), Color::White));

    lines.push(Line::from(""));
    lines.push(heading("JSON Export"));
    lines.push(Line::from(""));

    if let Ok(json) = stored.to_json() {
        for line in json.lines() {
            lines.push(Line::from(Span::styled(
                line.to_string(),
                Style::default().fg(Color::Green),
            )));
        }
    }

    Text::from(lines)
}

fn render_analysis(app: &App, generator: &Generator) -> Text<'static> {
    let data = generator.data();
    let mut lines: Vec<Line> = Vec::new();

    lines.push(heading(&format!("Rarity Odds at Player Level {}", app.player_level)));
    lines.push(Line::from(Span::styled(
        format!("  {:<14}{:>8}{:>9}{:>10}  {}", "Rarity", "Weight", "Share", "Per 1000", "Power"),
        Style::default().fg(Color::DarkGray),
    )));
    for rate in analysis::rarity_drop_rates(data, app.player_level) {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:<14}", rate.rarity.to_string()),
                Style::default().fg(rarity_color(rate.rarity)),
            ),
            Span::raw(format!(
                "{:>8.1}{:>8.2}%{:>10.1}  {}",
                rate.weight, rate.share, rate.expected_per_1000, rate.power
            )),
        ]));
    }
    lines.push(Line::from(""));

    let upgrades = analysis::upgrade_chances(&data.tuning.rarity_upgrade, app.magic_find());
    lines.push(heading(&format!("Upgrade Cascade at MF {:.0}", app.magic_find())));
    if upgrades.steps.is_empty() {
        lines.push(Line::from(Span::styled(
            "  (upgrades disabled)".to_string(),
            Style::default().fg(Color::DarkGray),
        )));
    }
    for step in &upgrades.steps {
        lines.push(Line::from(format!(
            "  +{} rung{}: {:>7.3}% step, {:>9.5}% overall",
            step.step,
            if step.step == 1 { " " } else { "s" },
            step.chance * 100.0,
            step.cumulative * 100.0
        )));
    }
    lines.push(Line::from(""));

    if let Some(ref report) = app.report {
        lines.push(heading(&format!("Simulation ({} rolls)", report.samples)));
        lines.push(field(
            "Drops",
            format!(
                "{} ({:.1}%), {} weapons, {} armor",
                report.drops,
                report.drop_rate() * 100.0,
                report.weapons,
                report.armor
            ),
            Color::White,
        ));
        for (rarity, count) in &report.by_rarity {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {:<14}", rarity.to_string()),
                    Style::default().fg(rarity_color(*rarity)),
                ),
                Span::raw(format!("{:>6} {:>6.2}%", count, report.rarity_percent(*rarity))),
            ]));
        }
        let tiers: Vec<String> = report
            .by_tier
            .iter()
            .map(|(tier, count)| format!("T{}: {}", tier, count))
            .collect();
        lines.push(field("Tiers", tiers.join("  "), Color::White));
        lines.push(field(
            "Avg Bonuses",
            format!(
                "{:.2} stat, {:.2} action, {:.2} mods",
                report.avg_stat_bonuses, report.avg_action_bonuses, report.avg_modifications
            ),
            Color::White,
        ));
        lines.push(Line::from(""));
    }

    let validation = analysis::validate(data);
    lines.push(heading("Validation"));
    if validation.errors.is_empty() && validation.warnings.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No problems found".to_string(),
            Style::default().fg(Color::Green),
        )));
    }
    for e in &validation.errors {
        lines.push(Line::from(Span::styled(
            format!("  error: {}", e),
            Style::default().fg(Color::Red),
        )));
    }
    for w in &validation.warnings {
        lines.push(Line::from(Span::styled(
            format!("  warning: {}", w),
            Style::default().fg(Color::Yellow),
        )));
    }

    Text::from(lines)
}

fn render_help(f: &mut Frame, app: &App, area: Rect) {
    let help_text = if let Some(ref msg) = app.message {
        Span::styled(msg.clone(), Style::default().fg(Color::Yellow))
    } else {
        Span::raw("g/G: Roll | +/-: Player | ]/[: Dungeon | t/a/w: Theme/Enemy/Class | m: MF | s: Simulate | r: Reload | e: Export | Tab: Detail | d: Delete | q: Quit")
    };

    let help = Paragraph::new(Line::from(help_text))
        .block(Block::default().borders(Borders::ALL).title(" Help "));

    f.render_widget(help, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
