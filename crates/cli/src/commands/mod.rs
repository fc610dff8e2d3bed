//! CLI Commands

pub mod class;
pub mod import;
pub mod init;
pub mod period;
pub mod progress;
pub mod serve;
pub mod user;

pub use class::ClassCommand;
pub use import::ImportCommand;
pub use init::InitCommand;
pub use period::PeriodCommand;
pub use progress::ProgressCommand;
pub use serve::ServeCommand;
pub use user::UserCommand;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Context;
    use shared::AppConfig;
    use store::UserRepository;

    fn context(dir: &tempfile::TempDir) -> Context {
        Context::from_config(AppConfig {
            database: dir.path().join("school.db"),
            ..Default::default()
        })
    }

    fn init(ctx: &Context) {
        InitCommand {
            admin_email: Some("admin@school.vn".to_string()),
            admin_name: "Quản trị".to_string(),
            password: Some("admin-pass".to_string()),
            write_config: None,
        }
        .run(ctx)
        .unwrap();
    }

    #[test]
    fn test_init_once() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        init(&ctx);

        let again = InitCommand {
            admin_email: Some("other@school.vn".to_string()),
            admin_name: "X".to_string(),
            password: Some("pw".to_string()),
            write_config: None,
        };
        assert!(again.run(&ctx).is_err());
    }

    #[test]
    fn test_school_setup_and_import() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        init(&ctx);

        UserCommand {
            command: user::UserSubcommand::Add {
                email: "gv@school.vn".to_string(),
                name: "Cô Lan".to_string(),
                role: shared::Role::Teacher,
                class: None,
                password: Some("gv-pass".to_string()),
            },
        }
        .run(&ctx)
        .unwrap();
        ClassCommand {
            command: class::ClassSubcommand::Add {
                name: "10A1".to_string(),
                teacher: Some("gv@school.vn".to_string()),
                size: 40,
            },
        }
        .run(&ctx)
        .unwrap();
        PeriodCommand {
            command: period::PeriodSubcommand::Add {
                id: "HK1".to_string(),
                name: String::new(),
            },
        }
        .run(&ctx)
        .unwrap();

        let roster = dir.path().join("users.csv");
        std::fs::write(
            &roster,
            "email,password,name,role,className\n\
             hs@school.vn,hs-pass,Minh,học sinh,10A1\n\
             broken line\n\
             hs@school.vn,hs-pass,Minh,học sinh,10A1\n",
        )
        .unwrap();
        ImportCommand {
            command: import::ImportSubcommand::Users {
                file: roster.display().to_string(),
            },
        }
        .run(&ctx)
        .unwrap();

        ProgressCommand {
            class: "10A1".to_string(),
            period: "HK1".to_string(),
            json: true,
        }
        .run(&ctx)
        .unwrap();

        let core = ctx.open_core().unwrap();
        let student = core.store().find_user("hs@school.vn").unwrap().unwrap();
        assert_eq!(student.class_name.as_deref(), Some("10A1"));
        assert!(core.authenticate("hs@school.vn", "hs-pass").is_ok());
    }
}
