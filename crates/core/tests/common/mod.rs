use assetscope_core::{AssetUrlBranch, AssetUrlChain, AssetUrlSchema, Kv};
use indexmap::IndexMap;

/// Schema with two perspectives on the same machines: the cloud view
/// reuses the OS view below EC2 through a reference.
///
/// ```text
/// technology=aws / account=* / service=ec2 -> (technology=os subtree)
/// technology=os / family=windows / platform=windows server / version=2019|2022
/// ```
#[allow(dead_code)]
pub fn demo_schema() -> AssetUrlSchema {
    let mut schema = AssetUrlSchema::new("technology").expect("Should create schema");

    schema
        .add(AssetUrlBranch {
            path_segments: vec!["technology=aws".to_string()],
            key: "account".to_string(),
            title: Some("Account".to_string()),
            values: IndexMap::from([(
                "*".to_string(),
                Some(AssetUrlBranch {
                    key: "service".to_string(),
                    title: Some("Service".to_string()),
                    values: IndexMap::from([(
                        "ec2".to_string(),
                        Some(AssetUrlBranch {
                            references: vec!["technology=os".to_string()],
                            ..Default::default()
                        }),
                    )]),
                    ..Default::default()
                }),
            )]),
            ..Default::default()
        })
        .expect("Should add the aws subtree");

    schema
        .add(AssetUrlBranch {
            path_segments: vec!["technology=os".to_string()],
            key: "family".to_string(),
            title: Some("Platform Family".to_string()),
            values: IndexMap::from([(
                "windows".to_string(),
                Some(AssetUrlBranch {
                    key: "platform".to_string(),
                    title: Some("Platform".to_string()),
                    values: IndexMap::from([(
                        "windows server".to_string(),
                        Some(AssetUrlBranch {
                            key: "version".to_string(),
                            values: IndexMap::from([
                                ("2019".to_string(), None),
                                ("2022".to_string(), None),
                            ]),
                            ..Default::default()
                        }),
                    )]),
                    ..Default::default()
                }),
            )]),
            ..Default::default()
        })
        .expect("Should add the os subtree");

    schema.refresh_cache().expect("Should refresh cache");
    schema
}

/// Schema with two unrelated technologies that both know an `environment`
/// dimension accepting arbitrary values.
#[allow(dead_code)]
pub fn multi_root_schema() -> AssetUrlSchema {
    let mut schema = AssetUrlSchema::new("technology").expect("Should create schema");

    for tech in ["tech1", "tech2"] {
        schema
            .add(AssetUrlBranch {
                path_segments: vec![format!("technology={tech}")],
                key: "environment".to_string(),
                values: IndexMap::from([("*".to_string(), None)]),
                ..Default::default()
            })
            .expect("Should add technology subtree");
    }

    schema.refresh_cache().expect("Should refresh cache");
    schema
}

#[allow(dead_code)]
pub fn chain(segments: &[&str]) -> AssetUrlChain {
    AssetUrlChain::from_segments(segments).expect("Should parse chain")
}

#[allow(dead_code)]
pub fn rendered(chains: &[AssetUrlChain]) -> Vec<String> {
    chains.iter().map(|c| c.to_string()).collect()
}

#[allow(dead_code)]
pub fn kv(key: &str, value: &str) -> Kv {
    Kv::new(key, value)
}
