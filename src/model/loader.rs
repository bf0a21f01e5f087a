use std::{path::Path, sync::Arc};

use parking_lot::Mutex;
use tch::{Device, Tensor, no_grad};
use tokenizers::Tokenizer;

use crate::{config::AppConfig, error::ServiceError};

// T5-family conventions: decoding starts from the pad token and stops at </s>.
const FALLBACK_DECODER_START_ID: i64 = 0;
const FALLBACK_EOS_ID: i64 = 1;

pub struct ModelArtifacts {
    pub tokenizer: Arc<Tokenizer>,
    pub model: Arc<Seq2SeqModule>,
}

pub struct Seq2SeqModule {
    device: Device,
    decoder_start_id: i64,
    eos_id: i64,
    module: Mutex<tch::CModule>,
}

impl ModelArtifacts {
    /// Loads the tokenizer and the traced seq2seq module. Any failure here is
    /// fatal: the server must not bind before both artifacts are usable.
    pub fn load(config: &AppConfig) -> Result<Self, ServiceError> {
        let tokenizer = Arc::new(
            Tokenizer::from_file(config.tokenizer_path.as_path())
                .map_err(|e| ServiceError::Startup(format!("tokenizer load failed: {e}")))?,
        );

        let decoder_start_id = tokenizer
            .token_to_id("<pad>")
            .map(i64::from)
            .unwrap_or(FALLBACK_DECODER_START_ID);
        let eos_id = tokenizer
            .token_to_id("</s>")
            .map(i64::from)
            .unwrap_or(FALLBACK_EOS_ID);

        let model = Arc::new(Seq2SeqModule::new(
            &config.model_path,
            config.device,
            decoder_start_id,
            eos_id,
        )?);

        Ok(Self { tokenizer, model })
    }
}

impl Seq2SeqModule {
    pub fn new(
        module_path: &Path,
        device: Device,
        decoder_start_id: i64,
        eos_id: i64,
    ) -> Result<Self, ServiceError> {
        if !module_path.exists() {
            return Err(ServiceError::Startup(format!(
                "model artifact missing: {}",
                module_path.display()
            )));
        }
        let mut module = tch::CModule::load_on_device(module_path, device)
            .map_err(|e| ServiceError::Startup(format!("model load failed: {e}")))?;
        module.set_eval();

        Ok(Self {
            device,
            decoder_start_id,
            eos_id,
            module: Mutex::new(module),
        })
    }

    /// Greedy encoder-decoder generation over the traced forward pass.
    /// The module mutex is the serialization point for concurrent callers.
    pub fn generate(
        &self,
        tokenizer: &Tokenizer,
        prompt: &str,
        max_output_tokens: usize,
    ) -> Result<String, ServiceError> {
        let encoding = tokenizer
            .encode(prompt, true)
            .map_err(|e| ServiceError::Translation(e.to_string()))?;
        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        if input_ids.is_empty() {
            return Err(ServiceError::Translation(
                "prompt produced no input tokens".into(),
            ));
        }

        let mut decoder_ids: Vec<i64> = vec![self.decoder_start_id];

        no_grad(|| {
            let module = self.module.lock();

            for _ in 0..max_output_tokens {
                let input_tensor = Tensor::from_slice(&input_ids)
                    .reshape([1, input_ids.len() as i64])
                    .to(self.device);
                let decoder_tensor = Tensor::from_slice(&decoder_ids)
                    .reshape([1, decoder_ids.len() as i64])
                    .to(self.device);

                // The traced model may return either a bare logits tensor or
                // a tuple with (logits, past).
                let output = module
                    .forward_is(&[
                        tch::IValue::Tensor(input_tensor),
                        tch::IValue::Tensor(decoder_tensor),
                    ])
                    .map_err(|e| ServiceError::Translation(e.to_string()))?;

                let logits = match output {
                    tch::IValue::Tensor(t) => t,
                    tch::IValue::Tuple(ref tuple) if !tuple.is_empty() => match &tuple[0] {
                        tch::IValue::Tensor(t) => t.shallow_clone(),
                        _ => {
                            return Err(ServiceError::Translation(
                                "expected tensor as first tuple element".into(),
                            ));
                        }
                    },
                    _ => {
                        return Err(ServiceError::Translation(
                            "unexpected model output format".into(),
                        ));
                    }
                };

                // Logits shape [1, decoder_len, vocab_size]; greedy pick at
                // the last position.
                let next_token_id = logits.select(1, -1).squeeze().argmax(0, false).int64_value(&[]);

                decoder_ids.push(next_token_id);

                if next_token_id == self.eos_id {
                    break;
                }
            }

            Ok::<(), ServiceError>(())
        })?;

        // Skip the decoder-start token; decode strips remaining specials.
        let generated_ids: Vec<u32> = decoder_ids[1..].iter().map(|&id| id as u32).collect();
        let translated = tokenizer
            .decode(&generated_ids, true)
            .map_err(|e| ServiceError::Translation(e.to_string()))?;

        Ok(translated)
    }
}
