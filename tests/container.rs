use autowire::{
    Autowired, Catalog, Config, Container, ContainerErrorKind, InstantiateErrorKind, RegisterErrorKind, ResolveErrorKind, Scope,
    TypeDescriptor,
};
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
};

mod singleton {
    use super::*;

    static POOLS: AtomicUsize = AtomicUsize::new(0);

    struct Pool;

    impl Default for Pool {
        fn default() -> Self {
            POOLS.fetch_add(1, Ordering::SeqCst);
            Self
        }
    }

    #[derive(Default)]
    struct Handler {
        pool: Autowired<Pool>,
    }

    fn container() -> Container {
        Container::new(
            Catalog::builder()
                .declare(TypeDescriptor::component::<Pool>().default_constructor())
                .declare(
                    TypeDescriptor::concrete::<Handler>()
                        .default_constructor()
                        .field("pool", |handler| &handler.pool),
                )
                .build(),
        )
        .unwrap()
    }

    #[test]
    fn test_shared_across_roots() {
        let container = container();

        let first = container.construct::<Handler>().unwrap();
        let second = container.construct::<Handler>().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(first.pool.get().unwrap(), second.pool.get().unwrap()));
        assert!(Arc::ptr_eq(first.pool.get().unwrap(), &container.get::<Pool>().unwrap()));
    }

    #[test]
    fn test_concurrent_first_access() {
        static LOCKS: AtomicUsize = AtomicUsize::new(0);

        struct Lock;

        let container = Container::new(
            Catalog::builder()
                .declare(TypeDescriptor::component::<Lock>().constructor(|| {
                    LOCKS.fetch_add(1, Ordering::SeqCst);
                    Ok(Lock)
                }))
                .build(),
        )
        .unwrap();

        let instances: Vec<Arc<Lock>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8).map(|_| scope.spawn(|| container.get::<Lock>().unwrap())).collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect()
        });

        assert_eq!(LOCKS.load(Ordering::SeqCst), 1);
        assert!(instances.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    }

    #[test]
    fn test_clones_share_instances() {
        let container = container();
        let clone = container.clone();

        assert!(Arc::ptr_eq(&container.get::<Pool>().unwrap(), &clone.get::<Pool>().unwrap()));
    }
}

mod prototype {
    use super::*;

    #[derive(Default)]
    struct Token;

    #[derive(Default)]
    struct Root {
        token: Autowired<Token>,
    }

    #[derive(Default)]
    struct Middle {
        root: Root,
        token: Autowired<Token>,
    }

    #[derive(Default)]
    struct Leaf {
        middle: Middle,
        token: Autowired<Token>,
    }

    fn container() -> Container {
        Container::new(
            Catalog::builder()
                .declare(
                    TypeDescriptor::component::<Token>()
                        .scope(Scope::Prototype)
                        .default_constructor(),
                )
                .declare(TypeDescriptor::concrete::<Root>().field("token", |root| &root.token))
                .declare(
                    TypeDescriptor::concrete::<Middle>()
                        .extends(|middle: &Middle| &middle.root)
                        .field("token", |middle| &middle.token),
                )
                .declare(
                    TypeDescriptor::concrete::<Leaf>()
                        .default_constructor()
                        .extends(|leaf: &Leaf| &leaf.middle)
                        .field("token", |leaf| &leaf.token),
                )
                .build(),
        )
        .unwrap()
    }

    #[test]
    fn test_distinct_instances() {
        let container = container();

        let a = container.get::<Token>().unwrap();
        let b = container.get::<Token>().unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &a));
    }

    #[test]
    fn test_inherited_points_get_own_instances() {
        let leaf = container().construct::<Leaf>().unwrap();

        let tokens = [
            leaf.middle.root.token.get().unwrap(),
            leaf.middle.token.get().unwrap(),
            leaf.token.get().unwrap(),
        ];
        assert!(!Arc::ptr_eq(tokens[0], tokens[1]));
        assert!(!Arc::ptr_eq(tokens[1], tokens[2]));
        assert!(!Arc::ptr_eq(tokens[0], tokens[2]));
    }

    #[test]
    fn test_reinject_is_noop() {
        let container = container();
        let leaf = Leaf::default();

        assert_eq!(container.inject(&leaf).unwrap(), 3);
        let token = leaf.token.get().unwrap().clone();

        assert_eq!(container.inject(&leaf).unwrap(), 0);
        assert_eq!(container.inject(&leaf.middle).unwrap(), 0);
        assert!(Arc::ptr_eq(&token, leaf.token.get().unwrap()));
    }
}

mod counted_chain {
    use super::*;

    static INSTANTIATIONS: AtomicUsize = AtomicUsize::new(0);

    struct Session;

    #[derive(Default)]
    struct SuperSuper {
        session: Autowired<Session>,
    }

    #[derive(Default)]
    struct Super {
        base: SuperSuper,
        session: Autowired<Session>,
    }

    #[derive(Default)]
    struct Sub {
        base: Super,
        session: Autowired<Session>,
    }

    #[test]
    fn test_one_instantiation_per_injection_point() {
        let container = Container::new(
            Catalog::builder()
                .declare(TypeDescriptor::concrete::<SuperSuper>().field("session", |value| &value.session))
                .declare(
                    TypeDescriptor::concrete::<Super>()
                        .extends(|value: &Super| &value.base)
                        .field("session", |value| &value.session),
                )
                .declare(
                    TypeDescriptor::concrete::<Sub>()
                        .default_constructor()
                        .extends(|value: &Sub| &value.base)
                        .field("session", |value| &value.session),
                )
                .declare(
                    TypeDescriptor::component::<Session>()
                        .scope(Scope::Prototype)
                        .constructor(|| {
                            INSTANTIATIONS.fetch_add(1, Ordering::SeqCst);
                            Ok(Session)
                        }),
                )
                .build(),
        )
        .unwrap();

        let sub = container.construct::<Sub>().unwrap();

        assert_eq!(INSTANTIATIONS.load(Ordering::SeqCst), 3);
        assert!(sub.base.base.session.is_resolved());

        assert_eq!(container.inject(&*sub).unwrap(), 0);
        assert_eq!(INSTANTIATIONS.load(Ordering::SeqCst), 3);
    }
}

mod qualifier {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> &'static str;
    }

    #[derive(Default)]
    struct English;

    impl Greeter for English {
        fn greet(&self) -> &'static str {
            "hello"
        }
    }

    #[derive(Default)]
    struct French;

    impl Greeter for French {
        fn greet(&self) -> &'static str {
            "bonjour"
        }
    }

    #[derive(Default)]
    struct Reception {
        first: Autowired<dyn Greeter>,
        second: Autowired<dyn Greeter>,
    }

    fn container() -> Container {
        Container::new(
            Catalog::builder()
                .declare(TypeDescriptor::abstract_type::<dyn Greeter>())
                .declare(
                    TypeDescriptor::concrete::<English>()
                        .default_constructor()
                        .qualifier("A")
                        .implements::<dyn Greeter>(|english| english as Arc<dyn Greeter>),
                )
                .declare(
                    TypeDescriptor::concrete::<French>()
                        .default_constructor()
                        .qualifier("B")
                        .implements::<dyn Greeter>(|french| french as Arc<dyn Greeter>),
                )
                .declare(
                    TypeDescriptor::concrete::<Reception>()
                        .default_constructor()
                        .qualified_field("first", "A", |reception| &reception.first)
                        .qualified_field("second", "B", |reception| &reception.second),
                )
                .build(),
        )
        .unwrap()
    }

    #[test]
    fn test_qualified_fields() {
        let reception = container().construct::<Reception>().unwrap();

        assert_eq!(reception.first.greet(), "hello");
        assert_eq!(reception.second.greet(), "bonjour");
    }

    #[test]
    fn test_get_qualified() {
        let container = container();

        assert_eq!(container.get_qualified::<dyn Greeter>("B").unwrap().greet(), "bonjour");
        assert!(container.get_qualified::<English>("A").is_ok());
        assert!(matches!(
            container.get_qualified::<French>("A"),
            Err(ResolveErrorKind::IncorrectType { .. })
        ));
    }

    #[test]
    fn test_unknown_qualifier() {
        let result = container().get_qualified::<dyn Greeter>("C");

        assert!(matches!(result, Err(ResolveErrorKind::NoSuchQualifier { qualifier: "C" })));
    }

    #[test]
    fn test_unqualified_is_ambiguous() {
        let err = container().get::<dyn Greeter>().err().unwrap();

        assert!(matches!(err, ResolveErrorKind::UnexpectedImplementationCount { .. }));
        assert_eq!(err.candidate_count(), Some(2));
    }

    #[test]
    fn test_duplicate_qualifier() {
        let result = Container::new(
            Catalog::builder()
                .declare(TypeDescriptor::concrete::<English>().qualifier("A"))
                .declare(TypeDescriptor::concrete::<French>().qualifier("A"))
                .build(),
        );

        assert!(matches!(
            result,
            Err(ContainerErrorKind::Register(RegisterErrorKind::DuplicateQualifier { qualifier: "A", .. }))
        ));
    }
}

mod cycle {
    use super::*;

    static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

    struct Left {
        right: Autowired<Right>,
    }

    struct Right {
        left: Autowired<Left>,
    }

    #[test]
    fn test_cycle_detected_at_registration() {
        let result = Container::new(
            Catalog::builder()
                .declare(
                    TypeDescriptor::component::<Left>()
                        .constructor(|| {
                            CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
                            Ok(Left { right: Autowired::new() })
                        })
                        .field("right", |left| &left.right),
                )
                .declare(
                    TypeDescriptor::component::<Right>()
                        .constructor(|| {
                            CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
                            Ok(Right { left: Autowired::new() })
                        })
                        .field("left", |right| &right.left),
                )
                .build(),
        );

        let Err(ContainerErrorKind::Register(RegisterErrorKind::DependencyCycle(cycle))) = result else {
            panic!("cycle expected");
        };
        assert_eq!(cycle.path.len(), 3);
        assert_eq!(cycle.path.first(), cycle.path.last());
        assert_eq!(CONSTRUCTED.load(Ordering::SeqCst), 0);
    }

    trait Store: Send + Sync {
        fn name(&self) -> &'static str;
    }

    #[derive(Default)]
    struct Disk;

    impl Store for Disk {
        fn name(&self) -> &'static str {
            "disk"
        }
    }

    #[derive(Default)]
    struct Service {
        store: Autowired<dyn Store>,
    }

    #[derive(Default)]
    struct FakeStore {
        service: Autowired<Service>,
    }

    impl Store for FakeStore {
        fn name(&self) -> &'static str {
            "fake"
        }
    }

    #[test]
    fn test_unregistered_implementation_is_not_a_cycle() {
        let container = Container::new(
            Catalog::builder()
                .declare(TypeDescriptor::abstract_type::<dyn Store>())
                .declare(
                    TypeDescriptor::component::<Disk>()
                        .default_constructor()
                        .implements::<dyn Store>(|disk| disk as Arc<dyn Store>),
                )
                .declare(
                    TypeDescriptor::component::<Service>()
                        .default_constructor()
                        .field("store", |service| &service.store),
                )
                .declare(
                    TypeDescriptor::concrete::<FakeStore>()
                        .default_constructor()
                        .field("service", |fake| &fake.service)
                        .implements::<dyn Store>(|fake| fake as Arc<dyn Store>),
                )
                .build(),
        )
        .unwrap();

        assert_eq!(container.get::<Service>().unwrap().store.name(), "disk");
    }

    #[test]
    fn test_registered_implementation_closing_cycle() {
        let result = Container::new(
            Catalog::builder()
                .declare(TypeDescriptor::abstract_type::<dyn Store>())
                .declare(TypeDescriptor::component::<Service>().field("store", |service| &service.store))
                .declare(
                    TypeDescriptor::component::<FakeStore>()
                        .field("service", |fake| &fake.service)
                        .implements::<dyn Store>(|fake| fake as Arc<dyn Store>),
                )
                .build(),
        );

        assert!(matches!(
            result,
            Err(ContainerErrorKind::Register(RegisterErrorKind::DependencyCycle(_)))
        ));
    }
}

mod abstract_type {
    use super::*;

    trait Store: Send + Sync {}

    #[derive(Default)]
    struct Disk;

    #[derive(Default)]
    struct Memory;

    impl Store for Disk {}
    impl Store for Memory {}

    #[derive(Default)]
    struct Cache {
        store: Autowired<dyn Store>,
    }

    fn builder() -> autowire::CatalogBuilder {
        Catalog::builder().declare(TypeDescriptor::abstract_type::<dyn Store>()).declare(
            TypeDescriptor::concrete::<Cache>()
                .default_constructor()
                .field("store", |cache| &cache.store),
        )
    }

    #[test]
    fn test_no_implementation() {
        let container = Container::new(builder().build()).unwrap();

        let err = container.construct::<Cache>().err().unwrap();

        assert_eq!(err.candidate_count(), Some(0));
    }

    #[test]
    fn test_two_implementations() {
        let container = Container::new(
            builder()
                .declare(TypeDescriptor::component::<Disk>().implements::<dyn Store>(|disk| disk as Arc<dyn Store>))
                .declare(TypeDescriptor::component::<Memory>().implements::<dyn Store>(|memory| memory as Arc<dyn Store>))
                .build(),
        )
        .unwrap();

        let err = container.get::<dyn Store>().err().unwrap();

        assert!(matches!(err, ResolveErrorKind::UnexpectedImplementationCount { .. }));
        assert_eq!(err.candidate_count(), Some(2));
    }

    #[test]
    fn test_single_implementation() {
        let container = Container::new(
            builder()
                .declare(
                    TypeDescriptor::component::<Disk>()
                        .default_constructor()
                        .implements::<dyn Store>(|disk| disk as Arc<dyn Store>),
                )
                .declare(TypeDescriptor::concrete::<Memory>().implements::<dyn Store>(|memory| memory as Arc<dyn Store>))
                .build(),
        )
        .unwrap();

        let cache = container.construct::<Cache>().unwrap();
        let disk = container.get::<Disk>().unwrap();

        let store = container.get::<dyn Store>().unwrap();

        assert_eq!(Arc::as_ptr(cache.store.get().unwrap()).cast::<()>(), Arc::as_ptr(&disk).cast::<()>());
        assert_eq!(Arc::as_ptr(&store).cast::<()>(), Arc::as_ptr(&disk).cast::<()>());
    }
}

mod factory {
    use super::*;

    static SETTINGS: AtomicUsize = AtomicUsize::new(0);

    struct Settings {
        host: &'static str,
    }

    #[derive(Debug, PartialEq)]
    struct Endpoint(String);

    #[derive(Default)]
    struct Repository {
        primary: Autowired<Endpoint>,
        replica: Autowired<Endpoint>,
    }

    fn catalog() -> Catalog {
        Catalog::builder()
            .declare(
                TypeDescriptor::component::<Settings>()
                    .constructor(|| {
                        SETTINGS.fetch_add(1, Ordering::SeqCst);
                        Ok(Settings { host: "db" })
                    })
                    .qualified_factory("primary", Scope::Singleton, "primary", |settings: &Settings| {
                        Ok::<_, InstantiateErrorKind>(Endpoint(format!("{}:5432", settings.host)))
                    })
                    .qualified_factory("replica", Scope::Prototype, "replica", |settings: &Settings| {
                        Ok::<_, InstantiateErrorKind>(Endpoint(format!("{}-replica:5432", settings.host)))
                    }),
            )
            .declare(
                TypeDescriptor::concrete::<Repository>()
                    .default_constructor()
                    .qualified_field("primary", "primary", |repository| &repository.primary)
                    .qualified_field("replica", "replica", |repository| &repository.replica),
            )
            .build()
    }

    #[test]
    fn test_method_sources() {
        let container = Container::new(catalog()).unwrap();
        assert_eq!(SETTINGS.load(Ordering::SeqCst), 0);

        let first = container.construct::<Repository>().unwrap();
        let second = container.construct::<Repository>().unwrap();

        assert_eq!(SETTINGS.load(Ordering::SeqCst), 1);
        assert_eq!(**first.primary.get().unwrap(), Endpoint("db:5432".to_owned()));
        assert_eq!(first.replica.0, "db-replica:5432");
        assert!(Arc::ptr_eq(first.primary.get().unwrap(), second.primary.get().unwrap()));
        assert!(!Arc::ptr_eq(first.replica.get().unwrap(), second.replica.get().unwrap()));
    }

    #[test]
    fn test_same_product_type_needs_qualifier() {
        let container = Container::new(catalog()).unwrap();

        let err = container.get::<Endpoint>().err().unwrap();

        assert_eq!(err.candidate_count(), Some(2));
    }

    #[test]
    fn test_failing_factory() {
        struct Broken;

        let container = Container::new(
            Catalog::builder()
                .declare(
                    TypeDescriptor::component::<Settings>()
                        .constructor(|| Ok(Settings { host: "db" }))
                        .factory("broken", Scope::Singleton, |_: &Settings| {
                            Err::<Broken, _>(InstantiateErrorKind::Custom(anyhow::anyhow!("no route to host")))
                        }),
                )
                .build(),
        )
        .unwrap();

        let result = container.get::<Broken>();

        assert!(matches!(result, Err(ResolveErrorKind::Instantiate(InstantiateErrorKind::Custom(_)))));
        assert!(container.get::<Settings>().is_ok());
    }
}

mod eager {
    use super::*;

    #[test]
    fn test_eager_failure_surfaces_at_startup() {
        struct NoConstructor;

        let result = Container::new_with_config(
            Catalog::builder().declare(TypeDescriptor::component::<NoConstructor>()).build(),
            Config::eager(),
        );

        assert!(matches!(
            result,
            Err(ContainerErrorKind::Resolve(ResolveErrorKind::Instantiate(
                InstantiateErrorKind::NoZeroArgumentConstructor { .. }
            )))
        ));
    }
}
