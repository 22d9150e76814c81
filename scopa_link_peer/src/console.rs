use std::io::Write;

use scopa_link_core::mirror::Installed;
use scopa_link_core::{CaptureIntent, Card, Inbound, MatchOutcome, Role, ScoreBreakdown, Session, Side};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use url::Url;

use crate::coordinator::PeerEvent;

/// 终端输入解析出的指令。出牌指令和语音识别的结果一样，都是 (点数, 花色)。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Start,
    Play(CaptureIntent),
    Show,
    Help,
    /// 加入方断线后重新连接大厅，不给地址就用上一次的地址
    Join(Option<Url>),
    Exit,
}

pub fn parse_command(line: &str) -> Result<ConsoleCommand, String> {
    let line = line.trim();
    let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

    match command {
        "start" => Ok(ConsoleCommand::Start),
        "show" => Ok(ConsoleCommand::Show),
        "help" => Ok(ConsoleCommand::Help),
        "exit" => Ok(ConsoleCommand::Exit),
        "join" if rest.trim().is_empty() => Ok(ConsoleCommand::Join(None)),
        "join" => Url::parse(rest.trim())
            .map(|url| ConsoleCommand::Join(Some(url)))
            .map_err(|e| format!("用法: join [ws://地址:端口/ws] ({})", e)),
        "play" => rest
            .parse()
            .map(ConsoleCommand::Play)
            .map_err(|e| format!("用法: play <点数> <花色> ({})", e)),
        // 直接说出牌名也可以，比如 "7 denari"
        _ => line
            .parse()
            .map(ConsoleCommand::Play)
            .map_err(|_| format!("未知命令: {}", line)),
    }
}

/// 启动一个任务读取标准输入，解析后排进协调任务的队列
pub fn spawn_stdin_reader(events: mpsc::Sender<PeerEvent>) {
    tokio::spawn(async move {
        let mut stdin = BufReader::new(tokio::io::stdin()).lines();
        loop {
            prompt();
            let line = match stdin.next_line().await {
                Ok(Some(line)) => line,
                // 输入结束等同于退出
                Ok(None) | Err(_) => {
                    let _ = events.send(PeerEvent::Console(ConsoleCommand::Exit)).await;
                    return;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            match parse_command(&line) {
                Ok(command) => {
                    let exit = command == ConsoleCommand::Exit;
                    if events.send(PeerEvent::Console(command)).await.is_err() || exit {
                        return;
                    }
                }
                Err(usage) => println!("{}", usage),
            }
        }
    });
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

pub fn print_help(role: Role) {
    println!("--- Scopa 双机对战 ---");
    println!("可用命令:");
    if role == Role::Host {
        println!("  start                     - 洗牌发牌，开始新的一局");
    } else {
        println!("  join [地址]               - 断线后重新连接大厅");
    }
    println!("  play <点数> <花色>        - 出牌，例如 play 7 denari");
    println!("  <点数> <花色>             - 同上，例如 re coppe");
    println!("  show                      - 查看桌面和手牌");
    println!("  exit                      - 退出");
}

fn cards_line(cards: &[Card]) -> String {
    if cards.is_empty() {
        return "(空)".to_string();
    }
    cards.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(" ")
}

fn side_name(session: &Session, side: Side) -> String {
    match side {
        Side::Player => session.local_name().to_string(),
        Side::Opponent => session.peer_name().unwrap_or("对手").to_string(),
    }
}

pub fn render_state(session: &Session) {
    let state = session.state();
    if !state.is_in_play() && !state.is_over() {
        println!("还没有进行中的对局");
        return;
    }

    println!();
    println!("牌堆剩余: {}", state.deck.len());
    println!("桌面: {}", cards_line(&state.table));
    println!("手牌: {}", cards_line(&state.hands.player));
    println!("对手手牌: {} 张", state.hands.opponent.len());
    println!(
        "吃牌: {} {} 张 / {} {} 张，扫桌 {} : {}",
        side_name(session, Side::Player),
        state.captured.player.len(),
        side_name(session, Side::Opponent),
        state.captured.opponent.len(),
        state.scopas.player,
        state.scopas.opponent,
    );
    if state.is_in_play() {
        println!("轮到: {}", side_name(session, state.turn));
    }
    prompt();
}

/// 结算明细，逐条列出每项的得主和总分
pub fn score_lines(session: &Session, score: &ScoreBreakdown) -> Vec<String> {
    let mut lines = vec!["--- 结算 ---".to_string()];
    let labels = ["张数", "金币", "金币7", "primera"];
    for (label, winner) in labels.iter().zip(score.criteria_winners()) {
        let who = winner.map_or("平".to_string(), |side| side_name(session, side));
        lines.push(format!("  {}: {}", label, who));
    }
    lines.push(format!("  扫桌: {} : {}", score.scopas.player, score.scopas.opponent));
    lines.push(format!(
        "  总分: {} {} : {} {}",
        side_name(session, Side::Player),
        score.totals.player,
        score.totals.opponent,
        side_name(session, Side::Opponent),
    ));
    lines.push(match score.outcome() {
        MatchOutcome::Winner(side) => format!("  胜者: {}", side_name(session, side)),
        MatchOutcome::Draw => "  平局".to_string(),
    });
    lines
}

pub fn render_score(session: &Session, score: &ScoreBreakdown) {
    println!();
    for line in score_lines(session, score) {
        println!("{}", line);
    }
}

pub fn render_inbound(session: &Session, inbound: &Inbound) {
    match inbound {
        Inbound::PeerNamed(name) => println!("\n对手: {}", name),
        Inbound::Lobby(name) => println!("\n大厅: {}", name),
        Inbound::Avatar(avatar) => println!("\n对手头像: {}", avatar),
        Inbound::Match(Installed::MatchStarted) => println!("\n新对局开始，等待发牌..."),
        Inbound::Match(Installed::Turn(_)) => render_state(session),
        Inbound::Match(Installed::Scored(score)) => render_score(session, score),
        Inbound::Match(Installed::MatchOver) => {
            println!("对局结束");
            prompt();
        }
        Inbound::Match(Installed::Updated(_)) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scopa_link_core::{Sides, Suit, all_cards, score_match};

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("start"), Ok(ConsoleCommand::Start));
        assert_eq!(parse_command("  show "), Ok(ConsoleCommand::Show));
        assert_eq!(parse_command("exit"), Ok(ConsoleCommand::Exit));
        assert_eq!(
            parse_command("play 7 denari"),
            Ok(ConsoleCommand::Play(CaptureIntent { value: 7, suit: Suit::Coins }))
        );
    }

    #[test]
    fn test_bare_phrase_is_a_play() {
        assert_eq!(
            parse_command("re di coppe"),
            Ok(ConsoleCommand::Play(CaptureIntent { value: 10, suit: Suit::Cups }))
        );
    }

    #[test]
    fn test_join_command() {
        assert_eq!(parse_command("join"), Ok(ConsoleCommand::Join(None)));
        let url = Url::parse("ws://192.168.1.20:25917/ws").unwrap();
        assert_eq!(parse_command("join ws://192.168.1.20:25917/ws"), Ok(ConsoleCommand::Join(Some(url))));
        assert!(parse_command("join non-un-indirizzo").is_err());
    }

    #[test]
    fn test_score_lines_name_the_winner() {
        let captured = Sides::new(
            all_cards().into_iter().filter(|c| c.suit != Suit::Clubs).collect(),
            all_cards().into_iter().filter(|c| c.suit == Suit::Clubs).collect(),
        );
        let score = score_match(&captured, &Sides::new(1, 0));
        let session = Session::host("Anna", "Bar Sport");

        let lines = score_lines(&session, &score);
        assert_eq!(lines.first().map(String::as_str), Some("--- 结算 ---"));
        assert!(lines.contains(&"  总分: Anna 5 : 0 对手".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("  胜者: Anna"));
    }

    #[test]
    fn test_bad_input_reports_usage() {
        assert!(parse_command("play 11 spade").is_err());
        assert!(parse_command("raise 100").is_err());
    }
}
