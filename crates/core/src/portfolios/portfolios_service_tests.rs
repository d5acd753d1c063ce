#[cfg(test)]
mod tests {
    use crate::errors::Error;
    use crate::memory::InMemoryStore;
    use crate::portfolios::{
        NewPortfolio, PortfolioService, PortfolioServiceTrait, PortfolioUpdate,
    };
    use std::sync::Arc;

    fn service() -> PortfolioService {
        PortfolioService::new(Arc::new(InMemoryStore::new()))
    }

    fn new_portfolio(name: &str) -> NewPortfolio {
        NewPortfolio {
            id: None,
            name: name.to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn create_trims_name_and_assigns_id() {
        let service = service();

        let portfolio = service
            .create_portfolio(new_portfolio("  Retirement "))
            .await
            .unwrap();

        assert_eq!(portfolio.name, "Retirement");
        assert!(!portfolio.id.is_empty());
        assert_eq!(service.get_portfolio(&portfolio.id).unwrap(), portfolio);
    }

    #[tokio::test]
    async fn create_rejects_blank_and_long_names() {
        let service = service();

        let blank = service.create_portfolio(new_portfolio("   ")).await;
        assert!(matches!(blank, Err(Error::Validation(_))));

        let long = service.create_portfolio(new_portfolio(&"x".repeat(101))).await;
        assert!(matches!(long, Err(Error::Validation(_))));

        assert!(service.list_portfolios().unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_changes_name_and_description() {
        let service = service();
        let created = service.create_portfolio(new_portfolio("Old")).await.unwrap();

        let updated = service
            .update_portfolio(PortfolioUpdate {
                id: Some(created.id.clone()),
                name: "New".to_string(),
                description: "long term".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(updated.name, "New");
        assert_eq!(updated.description, "long term");
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn update_requires_id() {
        let service = service();

        let result = service
            .update_portfolio(PortfolioUpdate {
                id: None,
                name: "New".to_string(),
                description: String::new(),
            })
            .await;

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn delete_unknown_portfolio_is_not_found() {
        let service = service();
        let created = service.create_portfolio(new_portfolio("Gone")).await.unwrap();

        service.delete_portfolio(&created.id).await.unwrap();

        assert!(matches!(
            service.get_portfolio(&created.id),
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            service.delete_portfolio(&created.id).await,
            Err(Error::NotFound { .. })
        ));
    }
}
