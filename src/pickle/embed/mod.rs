use crate::pickle::{Action, Board, Outcome, Side};

use poise::serenity_prelude as serenity;
use serenity::{
    ButtonStyle, Colour, CreateActionRow, CreateButton, CreateEmbed,
    CreateInteractionResponseFollowup, CreateInteractionResponseMessage,
};

pub const TITLE: &str = "Pickleball Matches Generator";

/// Discord rejects button labels longer than this
const MAX_LABEL_CHARS: usize = 80;

pub fn board_embed(board: &Board) -> CreateEmbed {
    let color = if board.can_generate() {
        Colour::DARK_GREEN
    } else {
        Colour::DARK_RED
    };
    CreateEmbed::new()
        .title(TITLE)
        .description(board.description())
        .color(color)
}

/// Label for a team button: the team's names, cut down to what Discord accepts
pub fn team_label(players: &[String]) -> String {
    let label = players.join(", ");
    if label.trim().is_empty() {
        return "?".to_string();
    }
    if label.chars().count() <= MAX_LABEL_CHARS {
        return label;
    }
    let mut short: String = label.chars().take(MAX_LABEL_CHARS - 1).collect();
    short.push('…');
    short
}

pub fn team_style(outcome: Outcome, side: Side) -> ButtonStyle {
    match outcome.winner() {
        None => ButtonStyle::Secondary,
        Some(winner) if winner == side => ButtonStyle::Success,
        Some(_) => ButtonStyle::Danger,
    }
}

/// Generate/Edit on the first row, then one row of team buttons per court
pub fn board_components(board: &Board, session_id: u64) -> Vec<CreateActionRow> {
    let generate_style = if board.can_generate() {
        ButtonStyle::Success
    } else {
        ButtonStyle::Danger
    };

    let controls = vec![
        CreateButton::new(Action::Generate.custom_id(session_id))
            .label("Generate")
            .style(generate_style)
            .disabled(!board.can_generate()),
        CreateButton::new(Action::Edit.custom_id(session_id))
            .label("Edit")
            .style(ButtonStyle::Primary),
    ];

    let mut rows = vec![CreateActionRow::Buttons(controls)];

    for (index, (court, outcome)) in board.courts().iter().enumerate() {
        let (left, right) = court.teams();
        let buttons = [(Side::Left, left), (Side::Right, right)]
            .into_iter()
            .map(|(side, team)| {
                CreateButton::new(Action::Team { court: index, side }.custom_id(session_id))
                    .label(team_label(team))
                    .style(team_style(*outcome, side))
            })
            .collect();
        rows.push(CreateActionRow::Buttons(buttons));
    }

    rows
}

pub fn board_reply(board: &Board, session_id: u64) -> poise::CreateReply {
    poise::CreateReply::default()
        .embed(board_embed(board))
        .components(board_components(board, session_id))
}

/// Replaces the message a button was pressed on
pub fn board_update(board: &Board, session_id: u64) -> CreateInteractionResponseMessage {
    CreateInteractionResponseMessage::new()
        .embed(board_embed(board))
        .components(board_components(board, session_id))
}

/// Edits the message from a follow-up, after the pressed button already
/// answered with a modal
pub fn board_followup(board: &Board, session_id: u64) -> CreateInteractionResponseFollowup {
    CreateInteractionResponseFollowup::new()
        .embed(board_embed(board))
        .components(board_components(board, session_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pickle::Session;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_team_label() {
        assert_eq!(team_label(&names(&["ann", "bo"])), "ann, bo");
        assert_eq!(team_label(&names(&[""])), "?");

        let long = "x".repeat(200);
        let label = team_label(&names(&[long.as_str()]));
        assert_eq!(label.chars().count(), MAX_LABEL_CHARS);
        assert!(label.ends_with('…'));
    }

    #[test]
    fn test_team_style() {
        assert_eq!(team_style(Outcome::Tie, Side::Left), ButtonStyle::Secondary);
        assert_eq!(team_style(Outcome::LeftWon, Side::Left), ButtonStyle::Success);
        assert_eq!(team_style(Outcome::LeftWon, Side::Right), ButtonStyle::Danger);
        assert_eq!(team_style(Outcome::RightWon, Side::Right), ButtonStyle::Success);
    }

    #[test]
    fn test_one_row_per_court() {
        let mut rng = StdRng::seed_from_u64(1);
        let session = Session::from_input("2", "2", "a,b,c,d,e,f,g,h,i,j,k,l");
        let board = session.generate(&mut rng, 4);
        assert_eq!(board_components(&board, 1).len(), 5);

        let failed = Session::from_input("2", "2", "a").generate(&mut rng, 4);
        assert_eq!(board_components(&failed, 1).len(), 1);
    }
}
