//! CLI argument parsing using clap derive
//!
//! The interface is flag-style: exactly one action flag per invocation.
//! Entity arguments accept a local ID or a unique name; `FILE` arguments
//! name a JSON document, or `-` for stdin.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{ArgGroup, CommandFactory, Parser};

/// rulectl - Manage security rules as code
#[derive(Parser, Debug)]
#[command(name = "rulectl")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("action").required(true).multiple(false)))]
#[command(after_help = "Keep the state directory under version control to track rule history.")]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the config file
    #[arg(long, global = true, env = "RULECTL_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// List rulesets and their rules
    #[arg(short, long, group = "action")]
    pub list: bool,

    /// Show the changes a push would make
    #[arg(short = 's', long, group = "action")]
    pub plan: bool,

    /// Print the plan as JSON (with --plan)
    #[arg(long)]
    pub json: bool,

    /// Push the active workspace's pending changes
    #[arg(short, long, group = "action")]
    pub push: bool,

    /// Push every workspace with pending changes
    #[arg(short = 'P', long, group = "action")]
    pub push_all: bool,

    /// Replace the local mirror with the platform's rules, discarding local edits
    #[arg(short, long, group = "action")]
    pub refresh: bool,

    /// Do not ask before discarding pending changes
    #[arg(short, long)]
    pub yes: bool,

    /// Switch to the workspace of an organization; refreshes if it has no mirror yet
    #[arg(short, long, group = "action", value_name = "ORG_ID")]
    pub workspace: Option<String>,

    /// Create a ruleset from a JSON file
    #[arg(short = 'a', long, group = "action", value_name = "FILE")]
    pub create_ruleset: Option<String>,

    /// Create a rule in a ruleset from a JSON file
    #[arg(short = 'c', long, group = "action", num_args = 2, value_names = ["RULESET", "FILE"])]
    pub create_rule: Option<Vec<String>>,

    /// Update a ruleset from a JSON file
    #[arg(short = 'U', long, group = "action", num_args = 2, value_names = ["RULESET", "FILE"])]
    pub update_ruleset: Option<Vec<String>>,

    /// Update a rule from a JSON file
    #[arg(short = 'u', long, group = "action", num_args = 2, value_names = ["RULE", "FILE"])]
    pub update_rule: Option<Vec<String>>,

    /// Replace a rule's tags with a flat JSON object
    #[arg(short = 't', long, group = "action", num_args = 2, value_names = ["RULE", "FILE"])]
    pub update_tags: Option<Vec<String>>,

    /// Delete a ruleset and its rules
    #[arg(short = 'D', long, group = "action", value_name = "RULESET")]
    pub delete_ruleset: Option<String>,

    /// Delete a rule
    #[arg(short = 'd', long, group = "action", value_name = "RULE")]
    pub delete_rule: Option<String>,

    /// Copy a rule into a ruleset of the active workspace
    #[arg(short = 'n', long, group = "action", num_args = 2, value_names = ["RULE", "RULESET"])]
    pub copy_rule: Option<Vec<String>>,

    /// Name for the rule copy (default: "<name> - COPY")
    #[arg(long, requires = "copy_rule", value_name = "NAME")]
    pub name: Option<String>,

    /// Copy a rule into a ruleset of another organization's workspace
    #[arg(short = 'N', long, group = "action", num_args = 3, value_names = ["RULE", "RULESET", "ORG_ID"])]
    pub copy_rule_out: Option<Vec<String>>,

    /// Copy a ruleset and its rules, optionally under a new name
    #[arg(short = 'm', long, group = "action", num_args = 1..=2, value_names = ["RULESET", "NEW_NAME"])]
    pub copy_ruleset: Option<Vec<String>>,

    /// Copy a ruleset and its rules into another organization's workspace
    #[arg(short = 'M', long, group = "action", num_args = 2, value_names = ["RULESET", "ORG_ID"])]
    pub copy_ruleset_out: Option<Vec<String>>,
}

/// The single action selected on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    List,
    Plan { json: bool },
    Push,
    PushAll,
    Refresh { yes: bool },
    Workspace { org_id: String },
    Edit(EditAction),
}

/// Actions that stage a local edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    CreateRuleset { file: String },
    CreateRule { ruleset: String, file: String },
    UpdateRuleset { ruleset: String, file: String },
    UpdateRule { rule: String, file: String },
    UpdateTags { rule: String, file: String },
    DeleteRuleset { ruleset: String },
    DeleteRule { rule: String },
    CopyRule { rule: String, ruleset: String, name: Option<String> },
    CopyRuleOut { rule: String, ruleset: String, org_id: String },
    CopyRuleset { ruleset: String, name: Option<String> },
    CopyRulesetOut { ruleset: String, org_id: String },
}

impl Cli {
    /// Parse the process arguments, exiting with a usage error on failure.
    pub fn parse_args() -> Self {
        Self::try_parse_args_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    /// Parse `args` and check the flag combinations clap cannot express:
    /// boolean action flags always carry a default, so `requires` on them
    /// never fails.
    pub fn try_parse_args_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli = Self::try_parse_from(args)?;
        if cli.json && !cli.plan {
            return Err(Self::command().error(
                ErrorKind::MissingRequiredArgument,
                "the argument '--json' can only be used with '--plan'",
            ));
        }
        Ok(cli)
    }

    /// Resolve the parsed flags into one [`Action`].
    pub fn action(&self) -> Option<Action> {
        if self.list {
            return Some(Action::List);
        }
        if self.plan {
            return Some(Action::Plan { json: self.json });
        }
        if self.push {
            return Some(Action::Push);
        }
        if self.push_all {
            return Some(Action::PushAll);
        }
        if self.refresh {
            return Some(Action::Refresh { yes: self.yes });
        }
        if let Some(org_id) = &self.workspace {
            return Some(Action::Workspace {
                org_id: org_id.clone(),
            });
        }
        self.edit_action().map(Action::Edit)
    }

    fn edit_action(&self) -> Option<EditAction> {
        if let Some(file) = &self.create_ruleset {
            return Some(EditAction::CreateRuleset { file: file.clone() });
        }
        if let Some([ruleset, file]) = self.create_rule.as_deref() {
            return Some(EditAction::CreateRule {
                ruleset: ruleset.clone(),
                file: file.clone(),
            });
        }
        if let Some([ruleset, file]) = self.update_ruleset.as_deref() {
            return Some(EditAction::UpdateRuleset {
                ruleset: ruleset.clone(),
                file: file.clone(),
            });
        }
        if let Some([rule, file]) = self.update_rule.as_deref() {
            return Some(EditAction::UpdateRule {
                rule: rule.clone(),
                file: file.clone(),
            });
        }
        if let Some([rule, file]) = self.update_tags.as_deref() {
            return Some(EditAction::UpdateTags {
                rule: rule.clone(),
                file: file.clone(),
            });
        }
        if let Some(ruleset) = &self.delete_ruleset {
            return Some(EditAction::DeleteRuleset {
                ruleset: ruleset.clone(),
            });
        }
        if let Some(rule) = &self.delete_rule {
            return Some(EditAction::DeleteRule { rule: rule.clone() });
        }
        if let Some([rule, ruleset]) = self.copy_rule.as_deref() {
            return Some(EditAction::CopyRule {
                rule: rule.clone(),
                ruleset: ruleset.clone(),
                name: self.name.clone(),
            });
        }
        if let Some([rule, ruleset, org_id]) = self.copy_rule_out.as_deref() {
            return Some(EditAction::CopyRuleOut {
                rule: rule.clone(),
                ruleset: ruleset.clone(),
                org_id: org_id.clone(),
            });
        }
        match self.copy_ruleset.as_deref() {
            Some([ruleset]) => {
                return Some(EditAction::CopyRuleset {
                    ruleset: ruleset.clone(),
                    name: None,
                });
            }
            Some([ruleset, name]) => {
                return Some(EditAction::CopyRuleset {
                    ruleset: ruleset.clone(),
                    name: Some(name.clone()),
                });
            }
            _ => {}
        }
        if let Some([ruleset, org_id]) = self.copy_ruleset_out.as_deref() {
            return Some(EditAction::CopyRulesetOut {
                ruleset: ruleset.clone(),
                org_id: org_id.clone(),
            });
        }
        None
    }
}
